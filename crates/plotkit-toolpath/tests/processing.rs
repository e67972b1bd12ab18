#[path = "processing/bounds_properties.rs"]
mod bounds_properties;
#[path = "processing/end_to_end.rs"]
mod end_to_end;
#[path = "processing/passthrough.rs"]
mod passthrough;
