use recall::*;

struct Circle;

impl Circle {
    #[memoize]
    fn area(&self) -> u64 {
        1
    }
}

fn main() {
    let _ = Circle;
}
