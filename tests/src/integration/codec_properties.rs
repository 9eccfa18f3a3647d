//! Sampled round-trip properties of the address codec and calculator.

#[cfg(test)]
mod tests {
    use ipam_address_model::{
        canonicalize, contains, format_v4, format_v6, parse_v4, parse_v6, subnet_range, IpNumber,
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Seeded so a failure reproduces.
    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x19A4_5EED)
    }

    #[test]
    fn test_v4_round_trip_sampled() {
        let mut rng = rng();
        for _ in 0..1_000 {
            let value: u32 = rng.gen();
            assert_eq!(parse_v4(&format_v4(value)).unwrap(), value);
        }
    }

    #[test]
    fn test_v6_round_trip_sampled() {
        let mut rng = rng();
        for _ in 0..1_000 {
            let value: u128 = rng.gen();
            assert_eq!(parse_v6(&format_v6(value)).unwrap(), value);
        }
    }

    #[test]
    fn test_v6_sparse_values_compress_and_round_trip() {
        let mut rng = rng();
        for _ in 0..1_000 {
            // Sparse values exercise the zero-run compression heavily.
            let group: u16 = rng.gen();
            let shift = rng.gen_range(0..8) * 16;
            let value = (group as u128) << shift;
            let text = format_v6(value);
            assert_eq!(parse_v6(&text).unwrap(), value);
        }
    }

    #[test]
    fn test_expanded_spelling_canonicalizes_to_compressed() {
        let mut rng = rng();
        for _ in 0..200 {
            let value: u128 = rng.gen::<u64>() as u128; // top half zero
            let expanded = (0..8)
                .map(|i| format!("{:04x}", (value >> (112 - 16 * i)) as u16))
                .collect::<Vec<_>>()
                .join(":");
            assert_eq!(
                canonicalize(&expanded).unwrap(),
                format_v6(value),
                "expanded spelling {expanded}"
            );
        }
    }

    #[test]
    fn test_every_usable_address_is_contained() {
        let network = IpNumber::parse("172.16.4.0").unwrap();
        let range = subnet_range(network, 26).unwrap();
        let mut current = range.first;
        loop {
            assert!(contains(current, network, 26).unwrap());
            if current == range.last {
                break;
            }
            current = current.succ().unwrap();
        }
        // One past the block is not contained.
        assert!(!contains(range.last.succ().unwrap().succ().unwrap(), network, 26).unwrap());
    }
}
