use quotebook_core::{reconcile, MergePolicy, Quote};

fn quote(text: &str, category: &str) -> Quote {
    Quote::new(text, category).unwrap()
}

fn local() -> Vec<Quote> {
    vec![quote("A", "x"), quote("B", "y")]
}

fn remote() -> Vec<Quote> {
    vec![
        quote("S1", "Technology"),
        quote("S2", "Philosophy"),
        quote("S3", "Life"),
    ]
}

#[test]
fn additive_rule_keeps_local_and_appends_remote() {
    let outcome = reconcile(&local(), &remote(), MergePolicy::Additive);

    assert!(outcome.changed);
    assert_eq!(outcome.added, 3);
    let texts: Vec<&str> = outcome.quotes.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B", "S1", "S2", "S3"]);
    assert!(outcome.note.contains('3'));
}

#[test]
fn server_overwrite_rule_yields_exactly_remote() {
    let outcome = reconcile(&local(), &remote(), MergePolicy::ServerOverwrite);

    assert!(outcome.changed);
    assert_eq!(outcome.quotes, remote());
}

#[test]
fn additive_rule_is_idempotent_across_cycles() {
    let first = reconcile(&local(), &remote(), MergePolicy::Additive);
    let second = reconcile(&first.quotes, &remote(), MergePolicy::Additive);

    assert!(!second.changed);
    assert_eq!(second.added, 0);
    assert_eq!(second.quotes, first.quotes);
}

#[test]
fn server_overwrite_rule_is_idempotent_across_cycles() {
    let first = reconcile(&local(), &remote(), MergePolicy::ServerOverwrite);
    let second = reconcile(&first.quotes, &remote(), MergePolicy::ServerOverwrite);

    assert!(!second.changed);
    assert_eq!(second.quotes, first.quotes);
}

#[test]
fn additive_rule_matches_by_text_only() {
    let local = vec![quote("S1", "Local category")];
    let outcome = reconcile(&local, &remote(), MergePolicy::Additive);

    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.quotes[0], quote("S1", "Local category"));
}
