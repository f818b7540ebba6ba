//! Rule-based intent classification
//!
//! Each intent has a handful of patterns; the intent with the most matches
//! wins, ties go to [`PRIORITY`], and text with no matches is an inquiry.

use std::sync::OnceLock;

use regex::Regex;

/// Intent categories a draft can be labelled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Inquiry,
    MeetingRequest,
    FollowUp,
    StatusUpdate,
    ProblemReport,
    Complaint,
    Apology,
    ThankYou,
    Introduction,
    Request,
    SalesPitch,
    Feedback,
    Invitation,
    Announcement,
    Application,
}

/// All categories, in scoring order
pub const ALL: [Intent; 15] = [
    Intent::Inquiry,
    Intent::MeetingRequest,
    Intent::FollowUp,
    Intent::StatusUpdate,
    Intent::ProblemReport,
    Intent::Complaint,
    Intent::Apology,
    Intent::ThankYou,
    Intent::Introduction,
    Intent::Request,
    Intent::SalesPitch,
    Intent::Feedback,
    Intent::Invitation,
    Intent::Announcement,
    Intent::Application,
];

/// Tie-break order for equally scored intents
pub const PRIORITY: [Intent; 8] = [
    Intent::Apology,
    Intent::ThankYou,
    Intent::ProblemReport,
    Intent::Complaint,
    Intent::MeetingRequest,
    Intent::FollowUp,
    Intent::Inquiry,
    Intent::Request,
];

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Inquiry => "inquiry",
            Intent::MeetingRequest => "meeting_request",
            Intent::FollowUp => "follow_up",
            Intent::StatusUpdate => "status_update",
            Intent::ProblemReport => "problem_report",
            Intent::Complaint => "complaint",
            Intent::Apology => "apology",
            Intent::ThankYou => "thank_you",
            Intent::Introduction => "introduction",
            Intent::Request => "request",
            Intent::SalesPitch => "sales_pitch",
            Intent::Feedback => "feedback",
            Intent::Invitation => "invitation",
            Intent::Announcement => "announcement",
            Intent::Application => "application",
        }
    }

    /// Tone usually appropriate for this kind of email
    pub fn recommended_tone(&self) -> &'static str {
        match self {
            Intent::Inquiry => "professional and inquisitive",
            Intent::MeetingRequest => "professional and courteous",
            Intent::FollowUp => "friendly but persistent",
            Intent::StatusUpdate => "informative and clear",
            Intent::ProblemReport => "concerned but composed",
            Intent::Complaint => "firm but respectful",
            Intent::Apology => "genuine and humble",
            Intent::ThankYou => "appreciative and warm",
            Intent::Introduction => "friendly and professional",
            Intent::Request => "polite and clear",
            Intent::SalesPitch => "persuasive but not pushy",
            Intent::Feedback => "constructive and thoughtful",
            Intent::Invitation => "welcoming and enthusiastic",
            Intent::Announcement => "informative and engaging",
            Intent::Application => "confident and professional",
        }
    }

    fn patterns(&self) -> &'static [&'static str] {
        match self {
            Intent::Inquiry => &[
                r"\b(?:what|who|when|where|why|how)\b.*\?",
                r"\bask(?:ing)?\b.*\babout\b",
                r"\bcurious\b|\bwonder(?:ing)?\b",
            ],
            Intent::MeetingRequest => &[
                r"\bmeet(?:ing)?\b.*\b(?:schedule|discuss|talk|available|time)\b",
                r"\b(?:schedule|set up|arrange)\b.*\b(?:meeting|call|discussion)\b",
                r"\bavailab(?:le|ility)\b.*\b(?:meet|discuss|talk)\b",
            ],
            Intent::FollowUp => &[
                r"\bfollow(?:ing)? up\b",
                r"\bjust check(?:ing)?\b",
                r"\bany update\b|\bany progress\b",
                r"\bhaven't heard\b",
            ],
            Intent::StatusUpdate => &[
                r"\bupdate\b.*\b(?:progress|status|project)\b",
                r"\bprogress report\b",
                r"\b(?:completed|finished|working on)\b.*\btask\b",
            ],
            Intent::ProblemReport => &[
                r"\bissue\b|\bproblem\b|\berror\b|\bfail(?:ed|ure)?\b",
                r"\bdifficult(?:y|ies)\b|\btrouble\b|\bnot working\b",
                r"\b(?:fix|resolve|address)\b.*\b(?:issue|problem)\b",
            ],
            Intent::Complaint => &[
                r"\bdissatisf(?:ied|action)\b|\bunhappy\b|\bfrustrat(?:ed|ing)\b",
                r"\bcomplain(?:t)?\b|\bdisappoint(?:ed|ing)\b",
                r"\bnot acceptable\b|\bunacceptable\b",
            ],
            Intent::Apology => &[
                r"\b(?:i'm|i am|we're|we are) sorry\b",
                r"\bapologi(?:ze|se|es)\b",
                r"\bregret\b|\bmistake\b.*\bour\b",
                r"\bmy bad\b",
            ],
            Intent::ThankYou => &[
                r"\bthank(?:s|ing|ful)?\b|\bapprec[ie]at\w+\b",
                r"\bgrateful\b|\bappreciation\b",
            ],
            Intent::Introduction => &[
                r"\bintroduc(?:e|ing|tion)\b|\bnice to meet\b",
                r"\bmy name is\b|\bi am\b.*\bfrom\b",
                r"\bi'd like to introduce\b",
            ],
            Intent::Request => &[
                r"\b(?:request|asking for|would like|need)\b.*\b(?:help|assistance|support|information)\b",
                r"\bcan you\b|\bcould you\b|\bwould you\b",
                r"\bplease\b.*\b(?:provide|send|review|consider)\b",
            ],
            Intent::SalesPitch => &[
                r"\b(?:offer|discount|promotion|deal|sale)\b",
                r"\b(?:product|service|solution)\b.*\b(?:benefit|feature|advantage)\b",
                r"\b(?:opportunity|limited time|special)\b",
            ],
            Intent::Feedback => &[
                r"\b(?:feedback|thoughts|opinion|suggestion|review)\b",
                r"\b(?:what do you think|your input|your view)\b",
                r"\b(?:evaluate|assessment|evaluation)\b",
            ],
            Intent::Invitation => &[
                r"\b(?:invite|invitation|join us|attend|participate)\b",
                r"\b(?:event|webinar|conference|party|celebration)\b",
                r"\bwould love for you to\b",
            ],
            Intent::Announcement => &[
                r"\b(?:announce|announcing|pleased to|happy to)\b.*\b(?:inform|share|tell)\b",
                r"\b(?:news|update|launch|release)\b",
                r"\bwe're excited\b|\bi'm excited\b",
            ],
            Intent::Application => &[
                r"\b(?:apply|applying|application)\b",
                r"\b(?:resume|cv|cover letter|portfolio)\b",
                r"\b(?:position|job|role|opportunity)\b.*\b(?:interest|consideration)\b",
            ],
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compiled_patterns() -> &'static [(Intent, Vec<Regex>)] {
    static PATTERNS: OnceLock<Vec<(Intent, Vec<Regex>)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        ALL.iter()
            .map(|intent| {
                let regexes = intent
                    .patterns()
                    .iter()
                    .filter_map(|p| match Regex::new(&format!("(?i){}", p)) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            tracing::warn!("Skipping intent pattern {:?}: {}", p, e);
                            None
                        }
                    })
                    .collect();
                (*intent, regexes)
            })
            .collect()
    })
}

/// Match count per intent, in [`ALL`] order
pub fn score(text: &str) -> Vec<(Intent, usize)> {
    compiled_patterns()
        .iter()
        .map(|(intent, regexes)| {
            let hits = regexes.iter().map(|re| re.find_iter(text).count()).sum();
            (*intent, hits)
        })
        .collect()
}

/// Classify `text` (subject and body) into a single intent
pub fn classify(text: &str) -> Intent {
    let scores = score(text);
    let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);

    if best == 0 {
        return Intent::Inquiry;
    }

    let top: Vec<Intent> = scores
        .iter()
        .filter(|(_, s)| *s == best)
        .map(|(i, _)| *i)
        .collect();

    PRIORITY
        .iter()
        .find(|p| top.contains(p))
        .or_else(|| top.first())
        .copied()
        .unwrap_or(Intent::Inquiry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        for (intent, regexes) in compiled_patterns() {
            assert_eq!(regexes.len(), intent.patterns().len(), "{}", intent);
        }
    }

    #[test]
    fn test_meeting_request() {
        let intent = classify("Roadmap Can we schedule a meeting to discuss the roadmap?");
        assert_eq!(intent, Intent::MeetingRequest);
        assert_eq!(intent.recommended_tone(), "professional and courteous");
    }

    #[test]
    fn test_apology_is_case_insensitive() {
        assert_eq!(
            classify("Delay I am sorry for the delay, I apologize."),
            Intent::Apology
        );
    }

    #[test]
    fn test_no_match_defaults_to_inquiry() {
        assert_eq!(classify("xyz qrs"), Intent::Inquiry);
        assert_eq!(classify(""), Intent::Inquiry);
    }

    #[test]
    fn test_ties_follow_priority() {
        // thank_you, problem_report and announcement each score once
        assert_eq!(
            classify("Thanks for the update on the issue"),
            Intent::ThankYou
        );
    }

    #[test]
    fn test_tie_outside_priority_takes_first_category() {
        // invitation and announcement each score once
        assert_eq!(classify("The launch party"), Intent::Invitation);
    }
}
