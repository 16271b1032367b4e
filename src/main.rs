#![allow(
    clippy::len_zero,
    clippy::needless_lifetimes,
    clippy::enum_variant_names,
    clippy::useless_format,
    clippy::redundant_clone
)]

#[macro_use]
mod macros;
mod acceptor;
mod cli;
mod client;
mod clientmem;
mod compositor;
mod config;
mod format;
mod globals;
mod icons;
mod ifs;
mod logger;
mod object;
mod rect;
mod renderer;
mod scene;
mod sighand;
mod utils;
mod wire;

fn main() {
    cli::main();
}
