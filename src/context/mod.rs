//! Execution contexts.
//!
//! A context decides where an operation's completion runs. The core imposes
//! none; this module provides the one that every test of cross-thread
//! completion needs: [`thread::on_new_thread`], which runs work on a
//! dedicated OS thread.

pub mod thread;

pub use thread::{on_new_thread, on_new_thread_with, ThreadOperation, ThreadSender};
