use quotebook_core::{
    CategoryFilter, ErrorKind, KeyValueStore, KvQuoteRepository, Quote, QuoteRepository,
    QuoteService, QuoteServiceError, QuoteValidationError, SqliteKeyValueStore,
    SqliteQuoteRepository, LAST_FILTER_KEY, QUOTES_KEY,
};

fn new_service() -> QuoteService<SqliteQuoteRepository> {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();
    QuoteService::load(KvQuoteRepository::new(store)).unwrap()
}

fn persisted_quotes(service: &QuoteService<SqliteQuoteRepository>) -> Vec<Quote> {
    service.repository().load_quotes().unwrap()
}

#[test]
fn add_grows_store_by_one_and_persists() {
    let mut service = new_service();
    service.add("First", "life").unwrap();

    let added = service.add("  Second  ", " tech ").unwrap();
    assert_eq!(added, Quote::new("Second", "tech").unwrap());
    assert_eq!(service.quotes().len(), 2);

    let raw = service
        .repository()
        .store()
        .get(QUOTES_KEY)
        .unwrap()
        .expect("quotes key should be written");
    assert!(raw.contains("\"text\":\"Second\""));
    assert_eq!(persisted_quotes(&service), service.quotes());
}

#[test]
fn add_with_blank_field_leaves_store_unchanged() {
    let mut service = new_service();
    service.add("Kept", "life").unwrap();

    let err = service.add("   ", "life").unwrap_err();
    assert!(matches!(
        err,
        QuoteServiceError::Validation(QuoteValidationError::EmptyText)
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = service.add("Text", "").unwrap_err();
    assert!(matches!(
        err,
        QuoteServiceError::Validation(QuoteValidationError::EmptyCategory)
    ));

    assert_eq!(service.quotes().len(), 1);
    assert_eq!(persisted_quotes(&service).len(), 1);
}

#[test]
fn export_then_import_into_fresh_store_round_trips() {
    let mut source = new_service();
    source.add("A", "x").unwrap();
    source.add("B", "y").unwrap();
    source.add("A", "z").unwrap();
    let exported = source.export_json().unwrap();
    assert!(exported.starts_with("[\n  {"));

    let mut target = new_service();
    let imported = target.import_json(&exported).unwrap();
    assert_eq!(imported, 3);
    assert_eq!(target.quotes(), source.quotes());
}

#[test]
fn import_appends_to_existing_quotes() {
    let mut service = new_service();
    service.add("Existing", "x").unwrap();

    service
        .import_json(r#"[{"text":"New","category":"y"}]"#)
        .unwrap();
    let texts: Vec<&str> = service.quotes().iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts, vec!["Existing", "New"]);
}

#[test]
fn import_of_object_payload_leaves_store_unchanged() {
    let mut service = new_service();
    service.add("Kept", "x").unwrap();

    let err = service
        .import_json(r#"{"text":"A","category":"x"}"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = service.import_json("not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);

    let err = service
        .import_json(r#"[{"text":"ok","category":"x"},{"text":"missing category"}]"#)
        .unwrap_err();
    assert!(matches!(err, QuoteServiceError::Import(_)));

    assert_eq!(service.quotes().len(), 1);
    assert_eq!(persisted_quotes(&service).len(), 1);
}

#[test]
fn all_filter_returns_entire_store_in_insertion_order() {
    let mut service = new_service();
    service.add("C", "life").unwrap();
    service.add("A", "tech").unwrap();
    service.add("B", "life").unwrap();

    service.set_filter(CategoryFilter::All).unwrap();
    let visible: Vec<&str> = service.visible().iter().map(|q| q.text.as_str()).collect();
    assert_eq!(visible, vec!["C", "A", "B"]);
}

#[test]
fn category_filter_narrows_view_and_persists_selection() {
    let mut service = new_service();
    service.add("C", "life").unwrap();
    service.add("A", "tech").unwrap();

    service.set_filter(CategoryFilter::parse("tech")).unwrap();
    let visible: Vec<&str> = service.visible().iter().map(|q| q.text.as_str()).collect();
    assert_eq!(visible, vec!["A"]);
    assert_eq!(
        service
            .repository()
            .store()
            .get(LAST_FILTER_KEY)
            .unwrap()
            .as_deref(),
        Some("tech")
    );
    assert_eq!(service.pick_random().map(|q| q.text.as_str()), Some("A"));
}

#[test]
fn absent_category_yields_empty_subset_and_no_random_pick() {
    let mut service = new_service();
    service.add("A", "life").unwrap();

    service.set_filter(CategoryFilter::parse("poetry")).unwrap();
    assert!(service.visible().is_empty());
    assert!(service.pick_random().is_none());
}

#[test]
fn restart_restores_quotes_and_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.sqlite3");
    {
        let repo = KvQuoteRepository::new(SqliteKeyValueStore::open(&path).unwrap());
        let mut service = QuoteService::load(repo).unwrap();
        service.add("A", "life").unwrap();
        service.set_filter(CategoryFilter::parse("life")).unwrap();
    }

    let repo = KvQuoteRepository::new(SqliteKeyValueStore::open(&path).unwrap());
    let service = QuoteService::load(repo).unwrap();
    assert_eq!(service.quotes().len(), 1);
    assert_eq!(service.filter(), &CategoryFilter::parse("life"));
    assert_eq!(service.categories(), vec!["all", "life"]);
}

#[test]
fn stale_persisted_filter_falls_back_to_all() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.sqlite3");
    {
        let store = SqliteKeyValueStore::open(&path).unwrap();
        store
            .put(QUOTES_KEY, r#"[{"text":"A","category":"life"}]"#)
            .unwrap();
        store.put(LAST_FILTER_KEY, "vanished").unwrap();

        let mut service = QuoteService::load(KvQuoteRepository::new(store)).unwrap();
        assert_eq!(service.filter(), &CategoryFilter::All);
        assert_eq!(service.visible().len(), 1);
        assert_eq!(
            service
                .repository()
                .store()
                .get(LAST_FILTER_KEY)
                .unwrap()
                .as_deref(),
            Some("all")
        );

        service.add("Verse", "vanished").unwrap();
    }

    let repo = KvQuoteRepository::new(SqliteKeyValueStore::open(&path).unwrap());
    let service = QuoteService::load(repo).unwrap();
    assert_eq!(service.filter(), &CategoryFilter::All);
    assert_eq!(service.visible().len(), 2);
}

#[test]
fn reserved_all_category_is_rejected_on_add_and_import() {
    let mut service = new_service();
    service.add("B", "life").unwrap();

    let err = service.add("A", "all").unwrap_err();
    assert!(matches!(
        err,
        QuoteServiceError::Validation(QuoteValidationError::ReservedCategory)
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let import = service
        .import_json(r#"[{"text":"C","category":"All"}]"#)
        .unwrap_err();
    assert!(matches!(import, QuoteServiceError::Import(_)));

    assert_eq!(service.quotes().len(), 1);
    assert_eq!(service.categories(), vec!["all", "life"]);
}

#[test]
fn corrupted_quotes_blob_is_reported_as_storage_error() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();
    store.put(QUOTES_KEY, "{broken").unwrap();

    let err = QuoteService::load(KvQuoteRepository::new(store))
        .err()
        .expect("load should fail");
    assert_eq!(err.kind(), ErrorKind::Storage);
}

#[test]
fn seed_defaults_only_fills_empty_book() {
    let mut service = new_service();
    assert!(service.seed_defaults_if_empty().unwrap());
    assert_eq!(service.quotes().len(), 4);
    assert!(!service.seed_defaults_if_empty().unwrap());
    assert_eq!(persisted_quotes(&service).len(), 4);
}
