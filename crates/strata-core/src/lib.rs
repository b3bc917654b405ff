//! Strata Core -- a material-transformation simulation engine.
//!
//! Strata models a set of stateful "stations" that accumulate, convert, or
//! separate materials over discrete simulation steps, governed by a
//! data-driven recipe table. Stations are placed into a [`driver::StationDriver`]
//! which advances each of them once per step; the only other inputs are
//! participant interaction events resolved by [`interact::resolve`].
//!
//! # Station trio
//!
//! - [`accumulator::AccumulatorStation`] -- holds a single fluid, or composts
//!   solid matter into a derived material over time.
//! - [`thermal::ThermalStation`] -- melts pending solid into a produced fluid
//!   while an external heat condition holds.
//! - [`separator::SeparatorStation`] -- works a batch of input material through
//!   a filtering medium, producing probabilistic yields from the recipe table.
//!
//! # External collaborators
//!
//! The core deliberately knows almost nothing about its host. It consumes two
//! narrow traits: [`station::HeatProvider`] (a boolean heat query at a station's
//! location) and [`station::WorldSink`] (a way to place materials into the
//! world when a buffer overflows or a station is removed). Persistence goes
//! through flat key/value records in [`record`].
//!
//! # Key types
//!
//! - [`driver::StationDriver`] -- owns placed stations and the step loop.
//! - [`recipe::RecipeTable`] -- immutable-after-build recipe policy, shared by
//!   every station.
//! - [`material::MaterialRegistry`] -- immutable material catalog.
//! - [`rng::SimRng`] -- caller-supplied deterministic PRNG for yield rolls.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type; probabilities never touch
//!   floats inside the sim loop.

pub mod accumulator;
pub mod dirty;
pub mod driver;
pub mod fixed;
pub mod id;
pub mod interact;
pub mod material;
pub mod recipe;
pub mod record;
pub mod rng;
pub mod separator;
pub mod station;
pub mod thermal;
pub mod tool;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
