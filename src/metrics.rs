use tracing::info;

/// Row counts for one pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
    pub read: usize,
    pub kept: usize,
}

impl StageStats {
    pub fn dropped(&self) -> usize {
        self.read.saturating_sub(self.kept)
    }
}

#[derive(Default)]
pub struct RunTracker {
    stages: Vec<(&'static str, StageStats)>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: &'static str, stats: StageStats) {
        info!(
            stage,
            read = stats.read,
            kept = stats.kept,
            dropped = stats.dropped(),
            "stage complete"
        );
        self.stages.push((stage, stats));
    }

    #[cfg(test)]
    pub fn get(&self, stage: &str) -> Option<StageStats> {
        self.stages
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, stats)| *stats)
    }

    pub fn print(&self) {
        println!("{:<12} | {:>8} | {:>8} | {:>8}", "Stage", "Read", "Kept", "Dropped");
        println!("{}", "-".repeat(45));
        for (name, s) in &self.stages {
            println!(
                "{:<12} | {:>8} | {:>8} | {:>8}",
                name,
                s.read,
                s.kept,
                s.dropped()
            );
        }
    }
}
