// SQLite reference session
//
// - params: conversion between engine values and SQLite storage classes
// - session: the blocking Session/Command implementation over rusqlite

pub mod params;
mod session;

pub use session::SqliteSession;
