//! Fixed-choice slash command parameters.
//!
//! Discord shows these as a dropdown, so the core enums never see free text
//! from the chat surface.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::core::{report::ReportPeriod, sale::PaymentPlan};

    /// Price tier picked at sale time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
    pub enum PlanChoice {
        #[name = "Cash"]
        Cash,
        #[name = "6 installments"]
        Six,
        #[name = "12 installments"]
        Twelve,
    }

    impl From<PlanChoice> for PaymentPlan {
        fn from(choice: PlanChoice) -> Self {
            match choice {
                PlanChoice::Cash => Self::Cash,
                PlanChoice::Six => Self::SixInstallments,
                PlanChoice::Twelve => Self::TwelveInstallments,
            }
        }
    }

    /// Time window of `/sales`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
    pub enum PeriodChoice {
        #[name = "Today"]
        Today,
        #[name = "Last 7 days"]
        Week,
        #[name = "This month"]
        Month,
        #[name = "All time"]
        All,
    }

    impl From<PeriodChoice> for ReportPeriod {
        fn from(choice: PeriodChoice) -> Self {
            match choice {
                PeriodChoice::Today => Self::Today,
                PeriodChoice::Week => Self::Week,
                PeriodChoice::Month => Self::Month,
                PeriodChoice::All => Self::All,
            }
        }
    }
}

pub use inner::*;
