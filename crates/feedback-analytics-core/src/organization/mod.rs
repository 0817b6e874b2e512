pub mod aggregator;

pub use aggregator::{
    aggregate_cohort, aggregate_organization, CohortStatus, IndividualSummary, OrganizationInput,
    OrganizationReport, OrganizationSectionResult,
};
