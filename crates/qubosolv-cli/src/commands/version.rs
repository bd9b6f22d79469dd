//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - QUBO solving on the Quantum Circle annealer",
        style("qubosolv").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qubosolv      Client library (auth, task submission, results)");
    println!("  qubosolv-cli  Command-line interface");
    println!();
    println!("Identity provider: {}", style(qubosolv::auth::SERVER_URL).dim());
    println!("API host:          {}", style(qubosolv::config::DEFAULT_HOST).dim());
    println!("License:           {}", style("Apache-2.0").dim());
}
