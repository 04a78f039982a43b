pub mod scripted_model;
