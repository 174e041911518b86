//! Simulated I2C master register file for host tests
//!
//! Records what reaches the wire and replays scripted results for each
//! transfer the driver starts.

use heapless::{Deque, Vec};
use tempwatch_hal::{Conditions, MasterRegisters, Status};

/// Something observable on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// START or repeated START with this address byte
    Start(u8),
    /// Byte sent by the master
    Transmit(u8),
    /// Byte sent by the target
    Receive(u8),
    /// STOP completing a successful transfer
    Stop,
    /// STOP forced by the driver without a transfer
    Abort,
}

/// Scripted outcome of one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    /// Fault flags to report once the engine goes idle
    pub faults: Status,
    /// Byte the target drives on a read
    pub data: u8,
    /// Status reads that report BUSY before the result appears
    pub busy_polls: u32,
}

impl Reply {
    /// Successful transfer
    pub const fn ok() -> Self {
        Self {
            faults: Status::empty(),
            data: 0xFF,
            busy_polls: 0,
        }
    }

    /// Successful read of `data`
    pub const fn data(data: u8) -> Self {
        Self {
            faults: Status::empty(),
            data,
            busy_polls: 0,
        }
    }

    /// Failed transfer with these flags
    pub const fn error(faults: Status) -> Self {
        Self {
            faults,
            data: 0xFF,
            busy_polls: 0,
        }
    }

    /// Stay busy for `polls` status reads first
    pub const fn after(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }
}

/// In-memory register file
#[derive(Debug)]
pub struct FakeRegisters {
    pub master_enabled: bool,
    pub timer_period: Option<u8>,
    pub msa: u8,
    mdr: u8,
    faults: Status,
    busy_remaining: u32,
    held: bool,
    replies: Deque<Reply, 32>,
    pub events: Vec<BusEvent, 64>,
    pub status_reads: u32,
}

impl FakeRegisters {
    pub fn new() -> Self {
        Self {
            master_enabled: false,
            timer_period: None,
            msa: 0,
            mdr: 0,
            faults: Status::empty(),
            busy_remaining: 0,
            held: false,
            replies: Deque::new(),
            events: Vec::new(),
            status_reads: 0,
        }
    }

    /// Queue the outcome of the next transfer
    pub fn reply(&mut self, reply: Reply) -> &mut Self {
        self.replies
            .push_back(reply)
            .expect("too many scripted replies");
        self
    }

    /// Bus is currently held by the master
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Every START-opened transaction closed by exactly one STOP
    pub fn transactions_closed(&self) -> bool {
        let mut open = false;
        for event in &self.events {
            match event {
                BusEvent::Start(_) => open = true,
                BusEvent::Stop | BusEvent::Abort => {
                    if !open {
                        return false;
                    }
                    open = false;
                }
                BusEvent::Transmit(_) | BusEvent::Receive(_) => {
                    if !open {
                        return false;
                    }
                }
            }
        }
        !open
    }

    /// Number of STOP conditions of either kind
    pub fn stop_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BusEvent::Stop | BusEvent::Abort))
            .count()
    }

    fn record(&mut self, event: BusEvent) {
        self.events.push(event).expect("event log full");
    }
}

impl MasterRegisters for FakeRegisters {
    fn enable_master(&mut self) {
        self.master_enabled = true;
    }

    fn set_timer_period(&mut self, period: u8) {
        self.timer_period = Some(period);
    }

    fn address(&self) -> u8 {
        self.msa
    }

    fn set_address(&mut self, value: u8) {
        self.msa = value;
    }

    fn write_data(&mut self, byte: u8) {
        self.mdr = byte;
    }

    fn read_data(&mut self) -> u8 {
        self.mdr
    }

    fn write_control(&mut self, conditions: Conditions) {
        if !conditions.contains(Conditions::RUN) {
            if conditions.contains(Conditions::STOP) {
                // A STOP on an idle bus is a no-op on the wire
                if self.held {
                    self.record(BusEvent::Abort);
                }
                self.held = false;
                self.faults = Status::empty();
            }
            return;
        }

        let reply = self.replies.pop_front().unwrap_or(Reply::ok());
        self.busy_remaining = reply.busy_polls;
        self.faults = reply.faults;

        if conditions.contains(Conditions::START) {
            self.record(BusEvent::Start(self.msa));
            self.held = true;
        }

        if reply.faults.is_empty() {
            if self.msa & 1 == 0 {
                self.record(BusEvent::Transmit(self.mdr));
            } else {
                self.mdr = reply.data;
                self.record(BusEvent::Receive(reply.data));
            }

            if conditions.contains(Conditions::STOP) {
                self.record(BusEvent::Stop);
                self.held = false;
            }
        }
    }

    fn status(&mut self) -> Status {
        self.status_reads += 1;
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            return Status::BUSY;
        }

        let line = if self.held {
            Status::BUS_BUSY
        } else {
            Status::IDLE
        };
        self.faults | line
    }
}
