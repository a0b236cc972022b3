use pdf_booklet::*;

#[test]
fn test_stats_no_pages() {
    let options = BookletOptions::default();
    let result = calculate_statistics(0, &options);
    assert!(matches!(result, Err(BookletError::NoPages)));
}

#[test]
fn test_stats_single_signature() {
    let options = BookletOptions::default();
    let stats = calculate_statistics(5, &options).unwrap();

    assert_eq!(stats.source_pages, 5);
    assert_eq!(stats.padded_pages, 8);
    assert_eq!(stats.blank_pages_added, 3);
    assert_eq!(stats.signatures, 1);
    assert_eq!(stats.pages_per_signature, vec![8]);
    assert_eq!(stats.output_spreads, 4);
    assert_eq!(stats.sheets, 2);
}

#[test]
fn test_stats_exact_fit() {
    let options = BookletOptions::default();
    let stats = calculate_statistics(16, &options).unwrap();

    assert_eq!(stats.padded_pages, 16);
    assert_eq!(stats.blank_pages_added, 0);
    assert_eq!(stats.output_spreads, 8);
    assert_eq!(stats.sheets, 4);
}

#[test]
fn test_stats_multiple_signatures() {
    let options = BookletOptions {
        signature_size: Some(4),
        ..Default::default()
    };
    let stats = calculate_statistics(10, &options).unwrap();

    assert_eq!(stats.padded_pages, 12);
    assert_eq!(stats.signatures, 3);
    assert_eq!(stats.pages_per_signature, vec![4, 4, 4]);
    assert_eq!(stats.output_spreads, 6);
}

#[test]
fn test_stats_short_final_signature() {
    // 6 rounds up to 8; the last signature holds what is left
    let options = BookletOptions {
        signature_size: Some(6),
        ..Default::default()
    };
    let stats = calculate_statistics(20, &options).unwrap();

    assert_eq!(stats.padded_pages, 20);
    assert_eq!(stats.pages_per_signature, vec![8, 8, 4]);
    assert_eq!(stats.sheets, 5);
}

#[test]
fn test_stats_invalid_options() {
    let options = BookletOptions {
        signature_size: Some(0),
        ..Default::default()
    };
    assert!(matches!(
        calculate_statistics(10, &options),
        Err(BookletError::InvalidArgument(_))
    ));
}
