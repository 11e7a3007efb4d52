//! Category taxonomy - two levels, five main categories of five each

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level document category (stage A of routing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainCategory {
    /// Home, education, health, contacts
    Personal,
    /// Banking, cards, payments, insurance, crypto
    Financial,
    /// Subscriptions, AI services, social, shopping, apps
    Digital,
    /// Servers, SaaS, development tools, communication
    Work,
    /// Telecom, utilities, government, licenses, transportation
    Infrastructure,
}

impl MainCategory {
    /// All main categories in taxonomy order
    pub const ALL: [MainCategory; 5] = [
        MainCategory::Personal,
        MainCategory::Financial,
        MainCategory::Digital,
        MainCategory::Work,
        MainCategory::Infrastructure,
    ];

    /// Get the category id
    pub fn as_str(&self) -> &'static str {
        match self {
            MainCategory::Personal => "personal",
            MainCategory::Financial => "financial",
            MainCategory::Digital => "digital",
            MainCategory::Work => "work",
            MainCategory::Infrastructure => "infrastructure",
        }
    }

    /// Parse a category id (exact match, surrounding whitespace ignored)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "personal" => Some(MainCategory::Personal),
            "financial" => Some(MainCategory::Financial),
            "digital" => Some(MainCategory::Digital),
            "work" => Some(MainCategory::Work),
            "infrastructure" => Some(MainCategory::Infrastructure),
            _ => None,
        }
    }

    /// The five sub-categories owned by this main category
    pub fn sub_categories(&self) -> [SubCategory; 5] {
        use SubCategory::*;
        match self {
            MainCategory::Personal => [
                PersonalHome,
                PersonalEducation,
                PersonalHealth,
                PersonalContacts,
                PersonalOther,
            ],
            MainCategory::Financial => [
                FinancialBanking,
                FinancialCreditCard,
                FinancialPayment,
                FinancialInsurance,
                FinancialCrypto,
            ],
            MainCategory::Digital => [
                DigitalSubscription,
                DigitalAi,
                DigitalSocial,
                DigitalShopping,
                DigitalApps,
            ],
            MainCategory::Work => [
                WorkServer,
                WorkSaas,
                WorkDevelopment,
                WorkCommunication,
                WorkOther,
            ],
            MainCategory::Infrastructure => [
                InfraTelecom,
                InfraUtilities,
                InfraGovernment,
                InfraLicense,
                InfraTransportation,
            ],
        }
    }
}

impl fmt::Display for MainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MainCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid main category: {}", s))
    }
}

/// Second-level category; selects the extraction schema and mapping rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum SubCategory {
    PersonalHome,
    PersonalEducation,
    PersonalHealth,
    PersonalContacts,
    PersonalOther,
    FinancialBanking,
    FinancialCreditCard,
    FinancialPayment,
    FinancialInsurance,
    FinancialCrypto,
    DigitalSubscription,
    #[serde(rename = "digitalAI")]
    DigitalAi,
    DigitalSocial,
    DigitalShopping,
    DigitalApps,
    WorkServer,
    #[serde(rename = "workSaaS")]
    WorkSaas,
    WorkDevelopment,
    WorkCommunication,
    WorkOther,
    InfraTelecom,
    InfraUtilities,
    InfraGovernment,
    InfraLicense,
    InfraTransportation,
}

impl SubCategory {
    /// All 25 sub-categories, grouped by main category
    pub const ALL: [SubCategory; 25] = {
        use SubCategory::*;
        [
            PersonalHome,
            PersonalEducation,
            PersonalHealth,
            PersonalContacts,
            PersonalOther,
            FinancialBanking,
            FinancialCreditCard,
            FinancialPayment,
            FinancialInsurance,
            FinancialCrypto,
            DigitalSubscription,
            DigitalAi,
            DigitalSocial,
            DigitalShopping,
            DigitalApps,
            WorkServer,
            WorkSaas,
            WorkDevelopment,
            WorkCommunication,
            WorkOther,
            InfraTelecom,
            InfraUtilities,
            InfraGovernment,
            InfraLicense,
            InfraTransportation,
        ]
    };

    /// Get the sub-category id (also the definition file stem)
    pub fn as_str(&self) -> &'static str {
        use SubCategory::*;
        match self {
            PersonalHome => "personalHome",
            PersonalEducation => "personalEducation",
            PersonalHealth => "personalHealth",
            PersonalContacts => "personalContacts",
            PersonalOther => "personalOther",
            FinancialBanking => "financialBanking",
            FinancialCreditCard => "financialCreditCard",
            FinancialPayment => "financialPayment",
            FinancialInsurance => "financialInsurance",
            FinancialCrypto => "financialCrypto",
            DigitalSubscription => "digitalSubscription",
            DigitalAi => "digitalAI",
            DigitalSocial => "digitalSocial",
            DigitalShopping => "digitalShopping",
            DigitalApps => "digitalApps",
            WorkServer => "workServer",
            WorkSaas => "workSaaS",
            WorkDevelopment => "workDevelopment",
            WorkCommunication => "workCommunication",
            WorkOther => "workOther",
            InfraTelecom => "infraTelecom",
            InfraUtilities => "infraUtilities",
            InfraGovernment => "infraGovernment",
            InfraLicense => "infraLicense",
            InfraTransportation => "infraTransportation",
        }
    }

    /// Parse a sub-category id
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|sub| sub.as_str() == s)
    }

    /// The main category that owns this sub-category
    pub fn main_category(&self) -> MainCategory {
        use SubCategory::*;
        match self {
            PersonalHome | PersonalEducation | PersonalHealth | PersonalContacts
            | PersonalOther => MainCategory::Personal,
            FinancialBanking | FinancialCreditCard | FinancialPayment | FinancialInsurance
            | FinancialCrypto => MainCategory::Financial,
            DigitalSubscription | DigitalAi | DigitalSocial | DigitalShopping | DigitalApps => {
                MainCategory::Digital
            }
            WorkServer | WorkSaas | WorkDevelopment | WorkCommunication | WorkOther => {
                MainCategory::Work
            }
            InfraTelecom | InfraUtilities | InfraGovernment | InfraLicense
            | InfraTransportation => MainCategory::Infrastructure,
        }
    }
}

impl fmt::Display for SubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid sub-category: {}", s))
    }
}

/// Prompt locale, chosen once per pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Japanese
    #[default]
    Ja,
    /// English
    En,
}

impl Language {
    /// Get the locale code
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }

    /// Parse a locale code
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ja" | "japanese" => Some(Language::Ja),
            "en" | "english" => Some(Language::En),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid language: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_sub_category_belongs_to_exactly_one_main() {
        for main in MainCategory::ALL {
            for sub in main.sub_categories() {
                assert_eq!(sub.main_category(), main, "{} under {}", sub, main);
            }
        }

        let listed: usize = MainCategory::ALL
            .iter()
            .map(|m| m.sub_categories().len())
            .sum();
        assert_eq!(listed, SubCategory::ALL.len());
    }

    #[test]
    fn test_sub_category_ids_parse_back() {
        for sub in SubCategory::ALL {
            assert_eq!(SubCategory::parse(sub.as_str()), Some(sub));
        }
        assert_eq!(SubCategory::parse("digitalAI"), Some(SubCategory::DigitalAi));
        assert_eq!(SubCategory::parse("workSaaS"), Some(SubCategory::WorkSaas));
        assert_eq!(SubCategory::parse("workSaas"), None);
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&SubCategory::DigitalAi).unwrap();
        assert_eq!(json, "\"digitalAI\"");

        let sub: SubCategory = serde_json::from_str("\"infraTelecom\"").unwrap();
        assert_eq!(sub, SubCategory::InfraTelecom);

        let main: MainCategory = serde_json::from_str("\"infrastructure\"").unwrap();
        assert_eq!(main, MainCategory::Infrastructure);
    }

    #[test]
    fn test_main_category_parse_rejects_unknown() {
        assert_eq!(MainCategory::parse(" work "), Some(MainCategory::Work));
        assert_eq!(MainCategory::parse("Work"), None);
        assert!("shopping".parse::<MainCategory>().is_err());
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("EN"), Some(Language::En));
        assert_eq!(Language::parse("japanese"), Some(Language::Ja));
        assert_eq!(Language::parse("fr"), None);
        assert_eq!(Language::default(), Language::Ja);
    }
}
