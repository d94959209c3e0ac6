//! TaskDeck: team task boards backed by SQLite, with a workflow engine that
//! moves tasks forward as their subtask checklists complete, audits every
//! status change, and fans changes out as notifications.

pub mod api;
pub mod db;
pub mod models;
pub mod workflow;
