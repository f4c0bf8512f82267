mod common;
mod eligibility;
mod lifecycle;
mod service;
