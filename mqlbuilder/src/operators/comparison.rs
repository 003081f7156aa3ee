//! Comparison operators. Operands are rendered as `[left, right]`; the
//! order is significant.

binary_operator!(Eq, "$eq", aliases = []);
binary_operator!(Ne, "$ne", aliases = []);
binary_operator!(Gt, "$gt", aliases = []);
binary_operator!(Gte, "$gte", aliases = []);
binary_operator!(Lt, "$lt", aliases = []);
binary_operator!(Lte, "$lte", aliases = []);
binary_operator!(
    /// `$cmp` returns -1, 0 or 1 depending on how `left` orders against
    /// `right`.
    Cmp,
    "$cmp",
    aliases = []
);
