//! Shape report and text dump.

use serde::Serialize;

use crate::context::ModuleContext;
use crate::declarations::Name;
use crate::ids::DeclKind;
use crate::shape::TypeShape;

/// One declaration in dump order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeEntry {
    pub category: DeclKind,
    pub name: String,
    /// `None` for declarations that never get a shape, i.e. interfaces.
    pub shape: Option<TypeShape>,
}

/// Every declaration, grouped by category in consumption order.
pub fn shape_report(ctx: &ModuleContext) -> Vec<ShapeEntry> {
    let decls = &ctx.decls;
    let mut entries = Vec::with_capacity(decls.len());

    for category in DeclKind::ALL {
        let names: Vec<Name> = match category {
            DeclKind::Const => decls.consts.iter().map(|info| info.name).collect(),
            DeclKind::Enum => decls.enums.iter().map(|info| info.name).collect(),
            DeclKind::Interface => decls.interfaces.iter().map(|info| info.name).collect(),
            DeclKind::Struct => decls.structs.iter().map(|info| info.name).collect(),
            DeclKind::Union => decls.unions.iter().map(|info| info.name).collect(),
        };
        entries.extend(names.into_iter().map(|name| ShapeEntry {
            category,
            name: ctx.name_str(&name),
            shape: ctx.shapes.get(&name).cloned(),
        }));
    }

    entries
}

/// Render the text dump.
///
/// Each category prints a blank line, its name and count, then every
/// declaration with its size and alignment. Declarations without a
/// resolved shape print the default shape.
pub fn dump(ctx: &ModuleContext) -> String {
    let entries = shape_report(ctx);
    let mut out = String::new();

    for category in DeclKind::ALL {
        let in_category: Vec<&ShapeEntry> =
            entries.iter().filter(|e| e.category == category).collect();
        out.push_str(&format!("\n{} {}\n", category, in_category.len()));

        for entry in in_category {
            let shape = entry.shape.clone().unwrap_or_default();
            out.push_str(&format!("\t{}\n", entry.name));
            out.push_str(&format!("\t\tsize: {}\n", shape.size));
            out.push_str(&format!("\t\talignment: {}\n", shape.alignment));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consume::consume_file;
    use crate::resolve::resolve_module;
    use crate::syntax::parse;

    fn resolved(source: &str) -> ModuleContext {
        let mut ctx = ModuleContext::new();
        consume_file(&mut ctx, parse(source).unwrap()).unwrap();
        resolve_module(&mut ctx).unwrap();
        ctx
    }

    #[test]
    fn test_empty_dump() {
        let ctx = ModuleContext::new();
        assert_eq!(
            dump(&ctx),
            "\nconst 0\n\nenum 0\n\ninterface 0\n\nstruct 0\n\nunion 0\n"
        );
    }

    #[test]
    fn test_dump_layout() {
        let ctx = resolved(
            r#"
            struct Pair { uint8 a; uint32 b; };
            interface Echo { 1: Echo(Pair p) -> (Pair p); };
            enum Flag : uint16 { ON = 1; };
            "#,
        );

        let expected = "\nconst 0\n\
            \nenum 1\n\tFlag\n\t\tsize: 2\n\t\talignment: 2\n\
            \ninterface 1\n\tEcho\n\t\tsize: 0\n\t\talignment: 1\n\
            \nstruct 1\n\tPair\n\t\tsize: 8\n\t\talignment: 4\n\
            \nunion 0\n";
        assert_eq!(dump(&ctx), expected);
    }

    #[test]
    fn test_report_order_and_interface_shape() {
        let ctx = resolved(
            r#"
            union U { uint8 a; };
            struct S { int64 x; };
            interface I { 1: M(); };
            const uint32 C = 1;
            "#,
        );

        let report = shape_report(&ctx);
        let names: Vec<_> = report.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["C", "I", "S", "U"]);
        assert_eq!(report[1].category, DeclKind::Interface);
        assert_eq!(report[1].shape, None);
        assert_eq!(report[2].shape, Some(TypeShape::new(8, 8)));
    }

    #[test]
    fn test_report_serializes() {
        let ctx = resolved("struct S { vector<uint8>:3 v; };");
        let json = serde_json::to_value(shape_report(&ctx)).unwrap();

        assert_eq!(json[0]["category"], "struct");
        assert_eq!(json[0]["name"], "S");
        assert_eq!(json[0]["shape"]["size"], 16);
        assert_eq!(json[0]["shape"]["allocations"][0]["bound"]["bounded"], 3);
    }
}
