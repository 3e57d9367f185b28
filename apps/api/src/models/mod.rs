pub mod company;
pub mod listing;
pub mod outreach;
