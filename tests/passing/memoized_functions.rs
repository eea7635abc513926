use recall::*;

#[memoize]
fn answer() -> u64 {
    42
}

#[memoize(at_most = 16)]
pub fn hypot(a: u32, b: u32) -> f64 {
    f64::from(a * a + b * b).sqrt()
}

#[memoize(id = "lookup::parse", at_most = 2)]
fn parse(raw: String) -> Result<i64, String> {
    raw.parse::<i64>().map_err(|e| e.to_string())
}

#[memoize]
fn words(text: String, limit: Option<usize>) -> Vec<String> {
    text.split_whitespace().take(limit.unwrap_or(usize::MAX)).map(str::to_owned).collect()
}

#[memoize(at_most = 100)]
fn distance(a: (i64, i64), b: (i64, i64)) -> f64 {
    (((a.0 - b.0).pow(2) + (a.1 - b.1).pow(2)) as f64).sqrt()
}

fn main() {
    let registry = Registry::new();
    let answer: MemoFn<(), u64> = answer_memoized(&registry).unwrap();
    let hypot: MemoFn<(u32, u32), f64> = hypot_memoized(&registry).unwrap();
    let parse: TryMemoFn<(String,), i64, String> = parse_memoized(&registry).unwrap();
    let words = words_memoized(&registry).unwrap();

    assert_eq!(answer.call(()).unwrap(), 42);
    assert_eq!(hypot.call((3, 4)).unwrap(), 5.0);
    assert_eq!(parse.call(("12".to_string(),)).unwrap(), 12);
    assert_eq!(words.call(("a b c".to_string(), Some(2))).unwrap(), vec!["a", "b"]);
    assert!(registry.is_registered("lookup::parse"));

    let distance: MemoFn<((i64, i64), (i64, i64)), f64> = distance_memoized(&registry).unwrap();
    assert_eq!(distance.call(((0, 0), (3, 4))).unwrap(), 5.0);
    assert_eq!(distance.handle().len(), 1);
}
