// Domain layer - Vaccination series, populations and milestones
pub mod figure;
pub mod milestone;
pub mod observation;
pub mod population;
