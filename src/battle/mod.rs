pub mod action_queue;
pub mod actions;
pub mod combatant;
pub mod conditions;
pub mod context;
pub mod damage;
pub mod engine;
pub mod events;
pub mod move_effects;
pub mod move_use;
pub mod rng;
pub mod state;
pub mod stats;
pub mod turn_order;
pub mod view;

#[cfg(test)]
pub(crate) mod tests;
