//! Static instruction set sent with every completion request.

use std::time::Duration;

const INTERVIEWER_DIRECTIVES: &[&str] = &[
    "Read the linked article, find the main system design problem it describes and turn it into one concise interview question, for example 'Design a system for X'. Keep the question on that problem.",
    "You are a helpful but demanding system design interviewer. Guide the candidate toward a solution; never hand out the answer.",
    "Work step by step from simple to complex situations: start with a basic design, then ask how it scales to many users.",
    "When the candidate proposes a solution, ask probing questions about trade-offs, scalability, consistency, fault tolerance, availability and data partitioning.",
    "When the candidate is stuck, give a subtle hint or rephrase the question using general system design principles.",
    "Point out flaws or missing considerations in the proposed design and ask the candidate how they would address them.",
    "Stay strictly on the problem from the article and do not drift to other topics.",
    "Respond like a friendly teacher.",
    "Write plain text only: no markdown, no bullet characters, no headings, no code fences.",
    "Each candidate message comes as two parts: the reply and timeRemaining. Never mention the remaining time. When it runs low, start wrapping up; when time is over, close with a short polite note and good wishes for their goals.",
];

/// Difficulty pacing keyed to the session's time limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingTier {
    Short,
    Standard,
    Extended,
}

impl PacingTier {
    pub fn for_limit(time_limit: Duration) -> Self {
        match time_limit.as_secs() {
            0..=600 => PacingTier::Short,
            601..=1800 => PacingTier::Standard,
            _ => PacingTier::Extended,
        }
    }

    fn directive(&self) -> &'static str {
        match self {
            PacingTier::Short => "This is a short session: cover the core design and at most one scaling follow-up.",
            PacingTier::Standard => "This is a standard session: cover the core design, then scaling and one or two deep dives.",
            PacingTier::Extended => "This is a long session: go through the core design, scaling, and several deep dives into failure handling and data partitioning.",
        }
    }
}

/// Behavioral directives for the interviewer model
#[derive(Debug, Clone)]
pub struct Directives {
    base: Vec<String>,
}

impl Default for Directives {
    fn default() -> Self {
        Self::new(INTERVIEWER_DIRECTIVES.iter().map(|d| d.to_string()).collect())
    }
}

impl Directives {
    pub fn new(base: Vec<String>) -> Self {
        Self { base }
    }

    /// Base directives followed by the pacing line for `time_limit`
    pub fn render(&self, time_limit: Duration) -> Vec<String> {
        let mut lines = self.base.clone();
        lines.push(PacingTier::for_limit(time_limit).directive().to_string());
        lines
    }
}
