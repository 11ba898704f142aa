// 过滤与显示名推导的性质测试
use helpcard::printers::directory::{PrinterEntry, derive_display_name, filter_printers};
use proptest::prelude::*;

fn share_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _-]{1,16}"
}

proptest! {
    #[test]
    fn display_name_of_unc_path_is_the_share_segment(share in share_name()) {
        let path = format!("\\\\PrintServer\\{}", share);
        prop_assert_eq!(derive_display_name(&path), share);
    }

    #[test]
    fn display_name_without_separator_is_identity(name in share_name()) {
        prop_assert_eq!(derive_display_name(&name), name);
    }

    #[test]
    fn blank_query_is_identity(shares in proptest::collection::vec(share_name(), 0..8)) {
        let entries: Vec<PrinterEntry> = shares
            .iter()
            .map(|s| PrinterEntry::from_canonical_path(format!("\\\\S\\{}", s)))
            .collect();

        prop_assert_eq!(filter_printers(&entries, ""), entries.clone());
        prop_assert_eq!(filter_printers(&entries, "  \t "), entries);
    }

    #[test]
    fn filter_result_is_an_order_preserving_subsequence(
        shares in proptest::collection::vec(share_name(), 0..8),
        query in "[A-Za-z0-9]{0,4}",
    ) {
        let entries: Vec<PrinterEntry> = shares
            .iter()
            .map(|s| PrinterEntry::from_canonical_path(format!("\\\\S\\{}", s)))
            .collect();

        let hits = filter_printers(&entries, &query);

        // 每个命中都满足大小写不敏感的子串匹配
        let needle = query.trim().to_lowercase();
        for hit in &hits {
            prop_assert!(hit.display_name.to_lowercase().contains(&needle));
        }

        // 命中序列保持源列表相对顺序
        let mut cursor = 0usize;
        for hit in &hits {
            let found = entries[cursor..].iter().position(|e| e == hit);
            prop_assert!(found.is_some(), "hit not found in remaining source order");
            cursor += found.unwrap_or(0) + 1;
        }
    }

    #[test]
    fn filter_is_case_insensitive(share in share_name()) {
        let entries = vec![PrinterEntry::from_canonical_path(format!("\\\\S\\{}", share))];

        let upper = filter_printers(&entries, &share.to_uppercase());
        let lower = filter_printers(&entries, &share.to_lowercase());

        prop_assert_eq!(upper.len(), 1);
        prop_assert_eq!(lower.len(), 1);
    }
}
