//! List command implementation

use crate::transports;

/// List all transports compiled into this binary
pub fn list_transports() {
    let transports = transports::available_transports();
    if transports.is_empty() {
        println!("No transports available (recompile with transport features enabled)");
        return;
    }

    println!("Supported transports:");
    println!();
    for t in &transports {
        println!("  {:10} - {}", t.name, t.description);
        if !t.aliases.is_empty() {
            println!("  {:10}   aliases: {}", "", t.aliases.join(", "));
        }
    }
}
