mod analyze;
mod health_check;
mod helpers;
