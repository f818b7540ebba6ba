//! Merging a user's free-text instruction into the inferred tone

use std::sync::OnceLock;

use regex::Regex;

/// Tone used when the analysis produced none
pub const DEFAULT_TONE: &str = "professional";

/// Instruction words and the tone phrase each one stands for
const REFINEMENT_TERMS: &[(&str, &str)] = &[
    ("formal", "formal and professional"),
    ("professional", "business-appropriate and polished"),
    ("friendly", "warm and personable"),
    ("casual", "relaxed and conversational"),
    ("concise", "brief and to the point"),
    ("detailed", "thorough and comprehensive"),
    ("persuasive", "compelling and convincing"),
    ("assertive", "confident and direct"),
    ("humble", "modest and respectful"),
    ("enthusiastic", "excited and positive"),
    ("urgent", "time-sensitive and pressing"),
    ("empathetic", "understanding and compassionate"),
    ("appreciative", "grateful and thankful"),
    ("considerate", "thoughtful and respectful"),
    ("apologetic", "regretful and remorseful"),
    ("firm", "resolute and unwavering"),
    ("diplomatic", "tactful and sensitive"),
    ("respectful", "courteous and deferential"),
    ("clear", "straightforward and unambiguous"),
    ("encouraging", "supportive and motivating"),
];

fn comparative_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\bbe (more|less) (\w+)").ok())
        .as_ref()
}

/// Tone adjustments recognised in an instruction, in table order
pub fn parse_instruction(instruction: &str) -> Vec<String> {
    let lower = instruction.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();

    let mut adjustments = Vec::new();

    for (term, phrase) in REFINEMENT_TERMS {
        if !words.contains(term) {
            continue;
        }
        if lower.contains(&format!("more {}", term)) {
            adjustments.push(format!("more {}", phrase));
        } else if lower.contains(&format!("less {}", term)) {
            adjustments.push(format!("less {}", phrase));
        } else {
            adjustments.push(phrase.to_string());
        }
    }

    // "be more W" / "be less W" for words outside the table
    if let Some(re) = comparative_pattern() {
        for caps in re.captures_iter(&lower) {
            let word = &caps[2];
            if REFINEMENT_TERMS.iter().any(|(term, _)| *term == word) {
                continue;
            }
            adjustments.push(format!("{} {}", &caps[1], word));
        }
    }

    adjustments
}

/// Combine the inferred tone with the user's instruction into one tone description
pub fn merge_user_instructions(inferred_tone: &str, instruction: &str) -> String {
    let inferred_tone = match inferred_tone.trim() {
        "" => DEFAULT_TONE,
        tone => tone,
    };
    let instruction = instruction.trim();

    if instruction.is_empty() {
        return inferred_tone.to_string();
    }

    let adjustments = parse_instruction(instruction);
    if adjustments.is_empty() {
        format!("{}, {}", inferred_tone, instruction)
    } else {
        format!("{}, while also being {}", inferred_tone, adjustments.join(", "))
    }
}
