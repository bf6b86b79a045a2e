use tegel_core::vocabulary::{self, AST_NODES};

/// Print the built-in node vocabulary, one name per line.
///
/// The default order is the one definition files use; `--sorted` gives the
/// declaration-file order.
pub fn run(sorted: bool) {
    let names = if sorted {
        vocabulary::sorted(AST_NODES)
    } else {
        AST_NODES.to_vec()
    };
    for name in names {
        println!("{name}");
    }
}
