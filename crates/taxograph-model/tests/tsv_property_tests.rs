use proptest::prelude::*;
use taxograph_model::tsv::{escape_cell, unescape_cell};
use taxograph_model::{
    assign_stanza_keys, read_statements, write_statements, Literal, LiteralTag, Object, Statement,
    Subject,
};

fn term() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,8}:[A-Za-z0-9_]{1,8}"
}

fn blank() -> impl Strategy<Value = String> {
    "_:b[0-9a-f]{4,16}"
}

fn text() -> impl Strategy<Value = String> {
    // Include the characters that need escaping.
    prop::collection::vec(
        prop_oneof![
            Just('\t'),
            Just('\n'),
            Just('\r'),
            Just('\\'),
            Just('"'),
            Just('|'),
            any::<char>(),
        ],
        0..24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn subject() -> impl Strategy<Value = Subject> {
    prop_oneof![term().prop_map(Subject::Curie), blank().prop_map(Subject::Blank)]
}

fn object() -> impl Strategy<Value = Object> {
    let tag = prop_oneof![
        Just(None),
        term().prop_map(|dt| Some(LiteralTag::Datatype(dt))),
        "[a-z]{2}(-[A-Z]{2})?".prop_map(|lt| Some(LiteralTag::Language(lt))),
    ];
    prop_oneof![
        "https?://[a-z]{1,8}\\.org/[a-z0-9#?=]{0,10}".prop_map(Object::Iri),
        term().prop_map(Object::Curie),
        blank().prop_map(Object::Blank),
        (text(), tag).prop_map(|(value, tag)| Object::Literal(Literal { value, tag })),
    ]
}

fn statement() -> impl Strategy<Value = Statement> {
    (subject(), term(), object()).prop_map(|(s, p, o)| Statement::new(s, p, o))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn unescape_inverts_escape(s in text()) {
        let escaped = escape_cell(&s);
        prop_assert!(!escaped.contains('\t'));
        prop_assert!(!escaped.contains('\n'));
        prop_assert_eq!(unescape_cell(&escaped), s);
    }

    #[test]
    fn statement_table_reconstructs_triples(mut rows in prop::collection::vec(statement(), 0..40)) {
        assign_stanza_keys(&mut rows);
        let mut buf = Vec::new();
        write_statements(&mut buf, &rows).unwrap();
        let back = read_statements(buf.as_slice()).unwrap();
        prop_assert_eq!(back, rows);
    }
}
