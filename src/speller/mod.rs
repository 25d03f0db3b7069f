// Spelling correction via an external speller service

pub mod client;
