use hazel_noun::{atom, cell, cue, jam, NounDecode, NounEncode};
use hazel_noun_derive::{NounDecode, NounEncode};

#[derive(Debug, Clone, PartialEq, Eq, NounEncode, NounDecode)]
struct Draft {
    version: u64,
    memo: String,
    urgent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, NounEncode, NounDecode)]
struct Checksum(u64);

#[derive(Debug, Clone, PartialEq, Eq, NounEncode, NounDecode)]
struct Span(u64, u64);

#[derive(Debug, Clone, PartialEq, Eq, NounEncode, NounDecode)]
struct Nothing;

#[test]
fn named_struct_encodes_as_nested_cells() {
    let draft = Draft {
        version: 3,
        memo: "hi".into(),
        urgent: false,
    };
    let noun = draft.to_noun();
    assert_eq!(
        noun,
        cell(atom(3), cell("hi".to_noun(), atom(1)))
    );
    assert_eq!(Draft::from_noun(&noun), Some(draft));
}

#[test]
fn named_struct_round_trips_through_jam() {
    let draft = Draft {
        version: 7,
        memo: "a longer memo that spans several words".into(),
        urgent: true,
    };
    let packed = jam(&draft.to_noun());
    let noun = cue(&packed).unwrap();
    assert_eq!(Draft::from_noun(&noun), Some(draft));
}

#[test]
fn newtype_struct_encodes_as_its_field() {
    let sum = Checksum(0xdead);
    assert_eq!(sum.to_noun(), atom(0xdead));
    assert_eq!(Checksum::from_noun(&atom(0xdead)), Some(sum));
}

#[test]
fn tuple_struct_round_trips() {
    let span = Span(2, 14);
    let noun = span.to_noun();
    assert_eq!(noun, cell(atom(2), atom(14)));
    assert_eq!(Span::from_noun(&noun), Some(span));
}

#[test]
fn unit_struct_is_the_zero_atom() {
    assert_eq!(Nothing.to_noun(), atom(0));
    assert_eq!(Nothing::from_noun(&atom(0)), Some(Nothing));
    assert_eq!(Nothing::from_noun(&atom(1)), None);
    assert_eq!(Nothing::from_noun(&cell(atom(0), atom(0))), None);
}

#[test]
fn decode_rejects_mismatched_shapes() {
    // An atom cannot populate a multi-field struct.
    assert_eq!(Draft::from_noun(&atom(5)), None);
    // A cell cannot populate a bare integer field.
    assert_eq!(Checksum::from_noun(&cell(atom(1), atom(2))), None);
}
