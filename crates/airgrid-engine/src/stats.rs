//! Per-run statistics: what each admitted agent achieved versus the
//! most it could have earned, plus rejection counts.

use airgrid_types::AgentId;

/// One admitted agent's outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionRecord {
    /// The admitted agent.
    pub agent: AgentId,
    /// Display name.
    pub name: String,
    /// Value of the trajectory actually committed.
    pub achieved_value: f64,
    /// Value of a perfectly satisfied trajectory (the agent's revenue).
    pub max_value: f64,
}

/// Accumulated outcomes for a simulation run.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    admissions: Vec<AdmissionRecord>,
    rejections: Vec<AgentId>,
}

impl Statistics {
    /// Create an empty statistics collector.
    pub const fn new() -> Self {
        Self {
            admissions: Vec::new(),
            rejections: Vec::new(),
        }
    }

    /// Record a successful admission.
    pub fn record_admission(
        &mut self,
        agent: AgentId,
        name: impl Into<String>,
        achieved_value: f64,
        max_value: f64,
    ) {
        self.admissions.push(AdmissionRecord {
            agent,
            name: name.into(),
            achieved_value,
            max_value,
        });
    }

    /// Record a rejected admission (no route found).
    pub fn record_rejection(&mut self, agent: AgentId) {
        self.rejections.push(agent);
    }

    /// Number of admitted agents.
    pub fn admitted_count(&self) -> usize {
        self.admissions.len()
    }

    /// Number of rejected agents.
    pub fn rejected_count(&self) -> usize {
        self.rejections.len()
    }

    /// The admission records, in admission order.
    pub fn admissions(&self) -> &[AdmissionRecord] {
        &self.admissions
    }

    /// Total welfare actually achieved.
    pub fn total_achieved(&self) -> f64 {
        self.admissions.iter().map(|r| r.achieved_value).sum()
    }

    /// Total welfare if every admitted agent had been perfectly served.
    pub fn total_max(&self) -> f64 {
        self.admissions.iter().map(|r| r.max_value).sum()
    }

    /// Achieved welfare as a fraction of the maximum, or 0.0 when
    /// nothing was admitted.
    pub fn efficiency(&self) -> f64 {
        let max = self.total_max();
        if max > 0.0 {
            self.total_achieved() / max
        } else {
            0.0
        }
    }

    /// Human-readable end-of-run report.
    pub fn report(&self) -> String {
        let mut out = String::from("agent\tachieved\tmax\n");
        for record in &self.admissions {
            out.push_str(&format!(
                "{}\t{:.1}\t{:.1}\n",
                record.name, record.achieved_value, record.max_value
            ));
        }
        out.push_str(&format!(
            "admitted: {}, rejected: {}, efficiency: {:.2}\n",
            self.admitted_count(),
            self.rejected_count(),
            self.efficiency()
        ));
        out
    }
}
