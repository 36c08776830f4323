mod filter_equivalence;
