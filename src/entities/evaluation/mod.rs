pub mod detailed_evaluation_entity;
pub mod evaluation_axis_entity;
