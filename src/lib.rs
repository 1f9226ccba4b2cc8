//! HVAC predictive scheduler
//!
//! Plans energy dispatch over a horizon of discrete steps by solving a linear
//! program that trades energy cost against comfort-band violation under a
//! single-coefficient thermal model.
//!
//! ```no_run
//! use hvac_scheduler::domain::ScheduleRequest;
//! use hvac_scheduler::optimizer::optimize_schedule;
//!
//! let request = ScheduleRequest {
//!     energy_prices: vec![0.10, 0.12, 0.15],
//!     comfort_min: 20.0,
//!     comfort_max: 24.0,
//!     initial_temp: 19.0,
//!     horizon_hours: 3,
//!     hvac_max_capacity: 5.0,
//!     temp_change_per_unit_energy: 0.5,
//!     cost_weight: 0.6,
//!     comfort_weight: 0.4,
//! };
//! let result = optimize_schedule(&request)?;
//! # Ok::<(), hvac_scheduler::optimizer::ScheduleError>(())
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod optimizer;
pub mod telemetry;
