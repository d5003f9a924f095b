//! Unit tests for the keyset pagination contract

use pretty_assertions::assert_eq;
use querygen::error::ErrorKind;
use querygen::pagination::{
    decode_cursor, encode_cursor, PageRequest, PaginationParams, PaginationResult,
};
use uuid::Uuid;

/// In-memory stand-in for `WHERE ($1 IS NULL OR id > $1) ORDER BY id ASC LIMIT $2`
fn fetch_page(rows: &[Uuid], request: &PageRequest) -> Vec<Uuid> {
    let mut ordered: Vec<Uuid> = rows
        .iter()
        .copied()
        .filter(|id| request.after.map_or(true, |after| *id > after))
        .collect();
    ordered.sort();
    ordered.truncate(request.fetch_limit() as usize);
    ordered
}

fn time_ordered_ids(count: usize) -> Vec<Uuid> {
    (0..count)
        .map(|_| {
            std::thread::sleep(std::time::Duration::from_millis(2));
            Uuid::now_v7()
        })
        .collect()
}

#[test]
fn test_three_rows_two_per_page() {
    let ids = time_ordered_ids(3);

    let first_request = PaginationParams::new(None, 2).validate().unwrap();
    let first = PaginationResult::from_rows(fetch_page(&ids, &first_request), first_request.limit, |id| *id);
    assert_eq!(first.items, vec![ids[0], ids[1]]);
    assert!(first.has_more);
    assert_eq!(first.next_cursor, Some(encode_cursor(&ids[1])));

    let second_request = PaginationParams::new(first.next_cursor.clone(), 2)
        .validate()
        .unwrap();
    let second = PaginationResult::from_rows(fetch_page(&ids, &second_request), second_request.limit, |id| *id);
    assert_eq!(second.items, vec![ids[2]]);
    assert!(!second.has_more);
    assert_eq!(second.next_cursor, None);
}

#[test]
fn test_walking_all_pages_visits_every_row_once() {
    let ids = time_ordered_ids(7);
    let mut seen = Vec::new();
    let mut cursor = None;

    loop {
        let request = PaginationParams::new(cursor.clone(), 3).validate().unwrap();
        let page = PaginationResult::from_rows(fetch_page(&ids, &request), request.limit, |id| *id);
        seen.extend(page.items.iter().copied());
        if !page.has_more {
            break;
        }
        cursor = page.next_cursor;
    }

    assert_eq!(seen, ids);
}

#[test]
fn test_exact_multiple_of_limit_ends_without_cursor() {
    let ids = time_ordered_ids(4);
    let request = PaginationParams::new(Some(encode_cursor(&ids[1])), 2)
        .validate()
        .unwrap();
    let page = PaginationResult::from_rows(fetch_page(&ids, &request), request.limit, |id| *id);
    assert_eq!(page.items, vec![ids[2], ids[3]]);
    assert!(!page.has_more);
    assert_eq!(page.next_cursor, None);
}

#[test]
fn test_cursor_round_trip_and_wire_format() {
    let id = Uuid::parse_str("01890a5d-ac96-774b-bcce-b302099a8057").unwrap();
    let cursor = encode_cursor(&id);
    assert_eq!(cursor, "AYkKXayWd0u8zrMCCZqAVw==");
    assert_eq!(decode_cursor(&cursor).unwrap(), Some(id));
}

#[test]
fn test_invalid_requests_are_pagination_errors() {
    let cases = [
        PaginationParams::new(None, -5),
        PaginationParams::new(None, 1000),
        PaginationParams::new(Some("%%%".to_string()), 10),
        PaginationParams::new(Some("AAAA".to_string()), 10),
    ];
    for params in cases {
        let err = params.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Pagination, "{:?}", params);
    }
}

#[test]
fn test_params_deserialize_with_defaults() {
    let params: PaginationParams = serde_json::from_str("{}").unwrap();
    assert_eq!(params, PaginationParams::new(None, 0));
    assert_eq!(params.validate().unwrap().limit, 20);
}
