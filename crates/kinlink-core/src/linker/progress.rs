/// Logs at fixed fractions of a known amount of work.
#[derive(Debug, Clone)]
pub struct Progress {
    label: &'static str,
    total: u64,
    updates: u64,
    done: u64,
    next_report: u64,
    reported: u64,
}

impl Progress {
    /// `updates == 0` or `total == 0` disables reporting.
    pub fn new(label: &'static str, total: u64, updates: usize) -> Self {
        let updates = updates as u64;
        let mut progress = Self {
            label,
            total,
            updates,
            done: 0,
            next_report: u64::MAX,
            reported: 0,
        };
        progress.schedule_next();
        progress
    }

    pub fn disabled() -> Self {
        Self::new("", 0, 0)
    }

    pub fn tick(&mut self) {
        self.done += 1;
        if self.done >= self.next_report {
            self.reported += 1;
            log::info!(
                "{}: {}% ({}/{})",
                self.label,
                self.done * 100 / self.total,
                self.done,
                self.total
            );
            self.schedule_next();
        }
    }

    pub fn done(&self) -> u64 {
        self.done
    }

    fn schedule_next(&mut self) {
        self.next_report = if self.updates == 0 || self.total == 0 || self.reported >= self.updates {
            u64::MAX
        } else {
            // ceil(total * (reported + 1) / updates), at least 1
            ((self.total * (self.reported + 1)).div_ceil(self.updates)).max(1)
        };
    }
}
