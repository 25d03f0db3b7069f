// Domain core: error taxonomy and data model

pub mod errors;
pub mod models;
