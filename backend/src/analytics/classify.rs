use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaintenanceType {
    Brake,
    Engine,
    Electrical,
    Coach,
    Routine,
    Door,
    #[serde(rename = "HVAC")]
    Hvac,
    Signal,
    General,
}

impl MaintenanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brake => "Brake",
            Self::Engine => "Engine",
            Self::Electrical => "Electrical",
            Self::Coach => "Coach",
            Self::Routine => "Routine",
            Self::Door => "Door",
            Self::Hvac => "HVAC",
            Self::Signal => "Signal",
            Self::General => "General",
        }
    }
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword vocabulary in match order. First hit wins, so "brake door fault"
/// is a Brake card.
pub const KEYWORDS: [(&str, MaintenanceType); 8] = [
    ("brake", MaintenanceType::Brake),
    ("engine", MaintenanceType::Engine),
    ("electrical", MaintenanceType::Electrical),
    ("coach", MaintenanceType::Coach),
    ("routine", MaintenanceType::Routine),
    ("door", MaintenanceType::Door),
    ("hvac", MaintenanceType::Hvac),
    ("signal", MaintenanceType::Signal),
];

struct Rule {
    pattern: Regex,
    category: MaintenanceType,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    KEYWORDS
        .iter()
        .map(|(keyword, category)| Rule {
            pattern: Regex::new(&format!("(?i){}", regex::escape(keyword)))
                .expect("escaped keyword is a valid pattern"),
            category: *category,
        })
        .collect()
});

/// Infers the maintenance type of a job card from its free-text description.
/// Descriptions matching no keyword are `General`.
pub fn classify(description: &str) -> MaintenanceType {
    RULES
        .iter()
        .find(|rule| rule.pattern.is_match(description))
        .map_or(MaintenanceType::General, |rule| rule.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively_anywhere() {
        assert_eq!(classify("BRAKE pad worn"), MaintenanceType::Brake);
        assert_eq!(classify("replace hvac filter"), MaintenanceType::Hvac);
        assert_eq!(classify("Signalling relay check"), MaintenanceType::Signal);
        assert_eq!(classify("Coach interior cleaning"), MaintenanceType::Coach);
    }

    #[test]
    fn earlier_keyword_wins() {
        assert_eq!(classify("door brake interlock"), MaintenanceType::Brake);
        assert_eq!(classify("routine door inspection"), MaintenanceType::Routine);
    }

    #[test]
    fn unmatched_falls_back_to_general() {
        assert_eq!(classify("graffiti removal"), MaintenanceType::General);
        assert_eq!(classify(""), MaintenanceType::General);
    }

    #[test]
    fn serializes_hvac_in_caps() {
        assert_eq!(serde_json::to_string(&MaintenanceType::Hvac).unwrap(), "\"HVAC\"");
        assert_eq!(MaintenanceType::Hvac.to_string(), "HVAC");
    }
}
