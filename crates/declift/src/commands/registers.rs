//! The `registers` command.

use declift::{ArchKind, RegisterCatalog};
use declift_ir::{LocationNames, MemoryLocation};

use crate::cli::EXIT_SUCCESS;
use crate::terminal;

/// Handle the `registers` command.
pub fn cmd_registers(arch: ArchKind) -> i32 {
    let architecture = arch.architecture(None);
    let catalog = architecture.catalog();
    terminal::header(&format!(
        "{arch}: {} registers, {} bit register file",
        catalog.len(),
        catalog.file_size()
    ));
    println!("{:<10} {:>8} {:>6}  parent", "name", "offset", "bits");
    for register in catalog.registers() {
        let parent = register
            .parent
            .and_then(|id| catalog.register(id).ok())
            .map_or("", |p| p.name.as_str());
        println!(
            "{:<10} {:>8} {:>6}  {parent}",
            register.name, register.location.addr, register.location.size
        );
    }
    for convention in architecture.conventions() {
        println!();
        terminal::header(&format!("convention {}", convention.name()));
        println!(
            "  stack pointer: {}",
            catalog_name(catalog, &convention.stack_pointer())
        );
        for group in convention.argument_groups() {
            let names: Vec<String> = group
                .locations
                .iter()
                .map(|loc| catalog_name(catalog, loc))
                .collect();
            println!("  {} arguments: {}", group.name, names.join(", "));
        }
        let returns: Vec<String> = convention
            .return_values()
            .iter()
            .map(|loc| catalog_name(catalog, loc))
            .collect();
        println!("  return values: {}", returns.join(", "));
    }
    EXIT_SUCCESS
}

fn catalog_name(catalog: &RegisterCatalog, location: &MemoryLocation) -> String {
    catalog
        .name_of(location)
        .map_or_else(|| location.to_string(), str::to_string)
}
