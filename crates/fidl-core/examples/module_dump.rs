//! Compile a small library and print its declaration shapes.

use fidl_core::Module;

fn main() {
    let source = r#"
        library examples.shapes;

        const uint32 kMaxName = 32;

        enum Kind : uint8 {
            FILE = 1;
            DIRECTORY = 2;
        };

        interface Directory {
            1: Open(string:kMaxName path, request<Directory> object);
            2: List() -> (vector<Entry> entries);
        };

        struct Entry {
            string:kMaxName name;
            Kind kind;
            uint64 size;
        };

        union Node {
            Entry entry;
            handle<vmo> contents;
        };
    "#;

    let mut module = Module::new();
    if module.compile_source(source).is_err() {
        eprint!("{}", module.render_diagnostics());
        std::process::exit(1);
    }

    print!("{}", module.dump());

    for entry in module.resolved_shapes() {
        if let Some(shape) = entry.shape {
            println!(
                "{} {}: {} allocation(s)",
                entry.category,
                entry.name,
                shape.allocations.len()
            );
        }
    }
}
