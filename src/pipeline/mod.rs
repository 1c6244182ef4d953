pub mod analysis;
pub mod capability;
pub mod extraction_example;
pub mod prompt_templates;
