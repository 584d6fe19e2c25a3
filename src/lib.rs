//! Stopwatch firmware for the ATmega128
//!
//! Cooperative virtual timers fed by a Timer1 tick interrupt, and an
//! XON/XOFF flow-controlled serial channel fed by the USART0 receive
//! interrupt. Hardware access is only compiled for AVR targets.
#![cfg_attr(not(test), no_std)]

pub mod application;
pub mod config;
pub mod drivers;
pub mod hal;
pub mod logger;
pub mod rtos;
pub mod serial;
pub mod storage;
