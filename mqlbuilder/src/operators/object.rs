single_operand_operator!(
    /// `$mergeObjects` combines documents; the operand may be a single
    /// document expression or a sequence of them.
    MergeObjects,
    "$mergeObjects"
);

single_operand_operator!(
    /// `$objectToArray` turns a document into an array of `{k, v}`
    /// documents.
    ObjectToArray,
    "$objectToArray"
);
