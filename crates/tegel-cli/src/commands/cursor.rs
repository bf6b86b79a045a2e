use tegel_core::cursor::positioned;

/// Print the position of every step of a cursor over `len` items, in the
/// `index:first:last:length` form generated tools accept as a loop argument.
pub fn run(len: usize) {
    let items = vec![(); len];
    for (pos, _) in positioned(&items) {
        println!("{pos}");
    }
}
