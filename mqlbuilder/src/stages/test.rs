mod bucket {
    use crate::{
        operators::Sum,
        stages::{Bucket, BucketAuto, Granularity},
        Error,
    };
    use bson::doc;

    test_statement!(
        bucket_minimal,
        expected = Ok(doc! {"$bucket": {"groupBy": "$price", "boundaries": [0, 200, 400]}}),
        input = Bucket::new("$price", vec![0, 200, 400]),
    );
    test_statement!(
        bucket_with_default_and_output,
        expected = Ok(doc! {
            "$bucket": {
                "groupBy": "$price",
                "boundaries": [0, 200],
                "default": "Other",
                "output": {"count": {"$sum": 1}},
            }
        }),
        input = Bucket::new("$price", vec![0, 200])
            .map(|b| b.with_default("Other"))
            .and_then(|b| b.with_output(crate::map! {"count" => Sum::new(1)})),
    );
    test_statement!(
        bucket_needs_two_boundaries,
        expected = Err(Error::InvalidOperand {
            owner: "$bucket",
            field: "boundaries".to_string(),
            reason: "at least two boundaries are required".to_string(),
        }),
        input = Bucket::new("$price", vec![0]),
    );
    test_statement!(
        bucket_rejects_non_document_output,
        expected = Err(Error::InvalidOperand {
            owner: "$bucket",
            field: "output".to_string(),
            reason: "expected a document of accumulators".to_string(),
        }),
        input = Bucket::new("$price", vec![0, 1]).and_then(|b| b.with_output("count")),
    );
    test_statement!(
        bucket_auto_with_granularity,
        expected = Ok(doc! {
            "$bucketAuto": {"groupBy": "$price", "buckets": 4, "granularity": "1-2-5"}
        }),
        input = BucketAuto::new("$price", 4).map(|b| b.with_granularity(Granularity::OneTwoFive)),
    );
    test_statement!(
        bucket_auto_rejects_zero_buckets,
        expected = Err(Error::InvalidOperand {
            owner: "$bucketAuto",
            field: "buckets".to_string(),
            reason: "must be a positive integer, got 0".to_string(),
        }),
        input = BucketAuto::new("$price", 0),
    );

    test_from_args!(
        bucket_from_wire_names,
        expected = Ok(doc! {"$bucket": {"groupBy": "$year", "boundaries": [1900, 2000]}}),
        stage = "$bucket",
        args = crate::args! {"groupBy" => "$year", "boundaries" => vec![1900, 2000], "default" => bson::Bson::Null},
    );
    test_from_args!(
        bucket_auto_from_args,
        expected = Ok(doc! {
            "$bucketAuto": {
                "groupBy": "$price",
                "buckets": 3,
                "output": {"n": {"$sum": 1}},
                "granularity": "POWERSOF2",
            }
        }),
        stage = "$bucketAuto",
        args = crate::args! {
            "by" => "$price",
            "buckets" => 3,
            "output" => doc! {"n": {"$sum": 1}},
            "granularity" => "POWERSOF2",
        },
    );
    test_from_args!(
        bucket_auto_unknown_granularity,
        expected = Err(Error::InvalidOperand {
            owner: "$bucketAuto",
            field: "granularity".to_string(),
            reason: "`R7` is not a supported granularity".to_string(),
        }),
        stage = "$bucketAuto",
        args = crate::args! {"group_by" => "$price", "buckets" => 3, "granularity" => "R7"},
    );

    #[test]
    fn granularity_names() {
        for name in [
            "R5", "R10", "R20", "R40", "R80", "1-2-5", "E6", "E12", "E24", "E48", "E96", "E192",
            "POWERSOF2",
        ] {
            let granularity = Granularity::try_from(name).expect("known granularity");
            assert_eq!(name, granularity.as_str());
        }
    }
}

mod count {
    use crate::{stages::Count, Error};
    use bson::doc;

    test_statement!(
        count,
        expected = Ok(doc! {"$count": "totalSales"}),
        input = Count::new("totalSales"),
    );
    test_statement!(
        empty_name,
        expected = Err(Error::MissingOperand {
            owner: "$count",
            field: "name".to_string(),
        }),
        input = Count::new(""),
    );
    test_statement!(
        field_path_name,
        expected = Err(Error::InvalidOperand {
            owner: "$count",
            field: "name".to_string(),
            reason: "`$total` must not start with `$`".to_string(),
        }),
        input = Count::new("$total"),
    );
    test_statement!(
        dotted_name,
        expected = Err(Error::InvalidOperand {
            owner: "$count",
            field: "name".to_string(),
            reason: "`a.b` must not contain `.`".to_string(),
        }),
        input = Count::new("a.b"),
    );

    test_from_args!(
        count_missing_name,
        expected = Err(Error::MissingOperand {
            owner: "$count",
            field: "name".to_string(),
        }),
        stage = "$count",
        args = crate::args! {},
    );
}

mod group {
    use crate::{
        expression::Express,
        operators::{Avg, Sum},
        stages::Group,
        Error,
    };
    use bson::doc;

    test_statement!(
        group_by_field,
        expected = Ok(doc! {"$group": {"_id": "$item", "total": {"$sum": "$qty"}}}),
        input = Group::new("$item", crate::map! {"total" => Sum::new("$qty")}),
    );
    test_statement!(
        group_all,
        expected = Ok(doc! {"$group": {"_id": null, "avg": {"$avg": "$qty"}}}),
        input = Group::all(crate::map! {"avg" => Avg::new("$qty")}),
    );
    test_statement!(
        query_id_wins,
        expected = Ok(doc! {"$group": {"_id": "$store", "n": {"$sum": 1}}}),
        input = Group::new("$item", crate::map! {"n" => Sum::new(1), "_id" => "$store"}),
    );
    test_statement!(
        group_needs_key,
        expected = Err(Error::MissingOperand {
            owner: "$group",
            field: "by".to_string(),
        }),
        input = Group::from_query(crate::map! {"n" => Sum::new(1)}),
    );

    #[test]
    fn id_is_rendered_first() {
        let group = Group::new("$item", crate::map! {"n" => Sum::new(1), "_id" => "$store"})
            .expect("valid group");
        let statement = group.statement().expect("renderable");
        let body = statement.get_document("$group").expect("group body");
        assert_eq!(vec!["_id", "n"], body.keys().collect::<Vec<_>>());
    }

    test_from_args!(
        explicit_null_groups_everything,
        expected = Ok(doc! {"$group": {"_id": null, "n": {"$sum": 1}}}),
        stage = "$group",
        args = crate::args! {"by" => bson::Bson::Null, "query" => doc! {"n": {"$sum": 1}}},
    );
    test_from_args!(
        id_alias,
        expected = Ok(doc! {"$group": {"_id": "$k"}}),
        stage = "$group",
        args = crate::args! {"_id" => "$k"},
    );
}

mod limit {
    use crate::{
        stages::{Limit, Sample, Skip},
        Error,
    };
    use bson::doc;

    test_statement!(
        limit,
        expected = Ok(doc! {"$limit": 3}),
        input = Limit::new(3),
    );
    test_statement!(
        limit_zero,
        expected = Err(Error::InvalidOperand {
            owner: "$limit",
            field: "value".to_string(),
            reason: "must be at least 1, got 0".to_string(),
        }),
        input = Limit::new(0),
    );
    test_statement!(
        limit_negative,
        expected = Err(Error::InvalidOperand {
            owner: "$limit",
            field: "value".to_string(),
            reason: "must be at least 1, got -2".to_string(),
        }),
        input = Limit::new(-2),
    );
    test_statement!(
        large_limit_is_int64,
        expected = Ok(doc! {"$limit": 5_000_000_000_i64}),
        input = Limit::new(5_000_000_000),
    );
    test_statement!(
        skip_zero,
        expected = Ok(doc! {"$skip": 0}),
        input = Skip::new(0),
    );
    test_statement!(
        skip_negative,
        expected = Err(Error::InvalidOperand {
            owner: "$skip",
            field: "value".to_string(),
            reason: "must be at least 0, got -1".to_string(),
        }),
        input = Skip::new(-1),
    );
    test_statement!(
        sample_default,
        expected = Ok(doc! {"$sample": {"size": 10}}),
        input = Ok::<_, Error>(Sample::default()),
    );
    test_statement!(
        sample,
        expected = Ok(doc! {"$sample": {"size": 5}}),
        input = Sample::new(5),
    );

    test_from_args!(
        sample_without_value,
        expected = Ok(doc! {"$sample": {"size": 10}}),
        stage = "$sample",
        args = crate::args! {},
    );
    test_from_args!(
        sample_size_alias,
        expected = Ok(doc! {"$sample": {"size": 2}}),
        stage = "$sample",
        args = crate::args! {"size" => 2},
    );
    test_from_args!(
        limit_not_an_integer,
        expected = Err(Error::InvalidOperand {
            owner: "$limit",
            field: "value".to_string(),
            reason: "expected an integer".to_string(),
        }),
        stage = "$limit",
        args = crate::args! {"value" => "three"},
    );
}

mod lookup {
    use crate::{
        operators::{Eq, Sum},
        stages::{Lookup, Match, Project, UnionWith},
        Error, Expression, Pipeline,
    };
    use bson::doc;

    test_statement!(
        equality_form,
        expected = Ok(doc! {
            "$lookup": {
                "from": "inventory",
                "localField": "item",
                "foreignField": "sku",
                "as": "inventory_docs",
            }
        }),
        input = Lookup::new("inventory", "item", "sku", "inventory_docs"),
    );
    test_statement!(
        pipeline_form_with_let,
        expected = Ok(doc! {
            "$lookup": {
                "from": "warehouses",
                "let": {"order_item": "$item"},
                "pipeline": [
                    {"$match": {"$expr": {"$eq": ["$stock_item", "$$order_item"]}}},
                    {"$project": {"_id": false}},
                ],
                "as": "stockdata",
            }
        }),
        input = Pipeline::new()
            .append(Match::expr(Eq::new("$stock_item", "$$order_item")))
            .project_fields(None, Some(vec!["_id"].into()))
            .and_then(|inner| Lookup::pipeline("warehouses", inner.into_nodes(), "stockdata"))
            .and_then(|l| l.with_let(crate::map! {"order_item" => "$item"})),
    );
    test_statement!(
        let_needs_pipeline,
        expected = Err(Error::InvalidOperand {
            owner: "$lookup",
            field: "let".to_string(),
            reason: "only allowed together with a pipeline".to_string(),
        }),
        input = Lookup::new("a", "b", "c", "d").and_then(|l| l.with_let(doc! {"x": 1})),
    );
    test_statement!(
        pipeline_elements_must_be_stages,
        expected = Err(Error::InvalidOperand {
            owner: "$lookup",
            field: "pipeline".to_string(),
            reason: "element 1 is not a stage".to_string(),
        }),
        input = Lookup::pipeline(
            "a",
            vec![Expression::from(doc! {"$limit": 1}), Expression::from(3)],
            "out"
        ),
    );
    test_statement!(
        pipeline_rejects_operators,
        expected = Err(Error::InvalidOperand {
            owner: "$lookup",
            field: "pipeline".to_string(),
            reason: "element 0 uses `$sum`, which is not a stage".to_string(),
        }),
        input = Lookup::pipeline("x", vec![Expression::from(Sum::new(1))], "out"),
    );
    test_statement!(
        pipeline_rejects_unknown_stage_documents,
        expected = Err(Error::InvalidOperand {
            owner: "$lookup",
            field: "pipeline".to_string(),
            reason: "element 1 uses `$frobnicate`, which is not a stage".to_string(),
        }),
        input = Lookup::pipeline(
            "x",
            vec![doc! {"$limit": 1}, doc! {"$frobnicate": 1}],
            "out"
        ),
    );
    test_statement!(
        pipeline_rejects_multi_key_documents,
        expected = Err(Error::InvalidOperand {
            owner: "$lookup",
            field: "pipeline".to_string(),
            reason: "element 0 is not a stage".to_string(),
        }),
        input = Lookup::pipeline("x", vec![doc! {"$limit": 1, "$skip": 2}], "out"),
    );
    test_statement!(
        union_with_rejects_empty_documents,
        expected = Err(Error::InvalidOperand {
            owner: "$unionWith",
            field: "pipeline".to_string(),
            reason: "element 0 is not a stage".to_string(),
        }),
        input = UnionWith::new("c").and_then(|u| u.with_pipeline(vec![doc! {}])),
    );
    test_statement!(
        output_field_required,
        expected = Err(Error::MissingOperand {
            owner: "$lookup",
            field: "as".to_string(),
        }),
        input = Lookup::new("a", "b", "c", ""),
    );
    test_statement!(
        union_with_pipeline,
        expected = Ok(doc! {
            "$unionWith": {"coll": "archive", "pipeline": [{"$project": {"state": true}}]}
        }),
        input = Project::include(["state"])
            .and_then(|p| UnionWith::new("archive")?.with_pipeline(vec![Expression::from(p)])),
    );
    test_statement!(
        union_with_collection,
        expected = Ok(doc! {"$unionWith": {"coll": "archive"}}),
        input = UnionWith::new("archive"),
    );

    test_from_args!(
        lookup_missing_foreign_field,
        expected = Err(Error::MissingOperand {
            owner: "$lookup",
            field: "foreign_field".to_string(),
        }),
        stage = "$lookup",
        args = crate::args! {"from" => "a", "localField" => "b", "as" => "c"},
    );
    test_from_args!(
        lookup_nothing_to_join_on,
        expected = Err(Error::MissingOperand {
            owner: "$lookup",
            field: "local_field|foreign_field|pipeline".to_string(),
        }),
        stage = "$lookup",
        args = crate::args! {"from" => "a", "as" => "c"},
    );
    test_from_args!(
        lookup_pipeline_documents,
        expected = Ok(doc! {
            "$lookup": {"from": "b", "pipeline": [{"$limit": 1}], "as": "c"}
        }),
        stage = "$lookup",
        args = crate::args! {"from" => "b", "pipeline" => vec![doc! {"$limit": 1}], "as" => "c"},
    );
}

mod match_stage {
    use crate::{operators::Gt, stages::Match, Error};
    use bson::doc;

    test_statement!(
        match_query,
        expected = Ok(doc! {"$match": {"status": "A", "qty": {"$lt": 30}}}),
        input = Match::new(doc! {"status": "A", "qty": {"$lt": 30}}),
    );
    test_statement!(
        match_everything,
        expected = Ok(doc! {"$match": {}}),
        input = Ok::<_, Error>(Match::default()),
    );
    test_statement!(
        match_expr,
        expected = Ok(doc! {"$match": {"$expr": {"$gt": ["$spent", "$budget"]}}}),
        input = Ok::<_, Error>(Match::expr(Gt::new("$spent", "$budget"))),
    );
    test_statement!(
        match_rejects_scalar,
        expected = Err(Error::InvalidOperand {
            owner: "$match",
            field: "query".to_string(),
            reason: "expected a query document".to_string(),
        }),
        input = Match::new(5),
    );

    test_from_args!(
        match_filter_alias,
        expected = Ok(doc! {"$match": {"a": 1}}),
        stage = "$match",
        args = crate::args! {"filter" => doc! {"a": 1}},
    );
    test_from_args!(
        match_alias_and_canonical,
        expected = Err(Error::InvalidOperand {
            owner: "$match",
            field: "query".to_string(),
            reason: "supplied more than once under different names".to_string(),
        }),
        stage = "$match",
        args = crate::args! {"filter" => doc! {"a": 1}, "query" => doc! {"a": 2}},
    );
}

mod out {
    use crate::{stages::Out, Error};
    use bson::doc;

    test_statement!(
        out_collection,
        expected = Ok(doc! {"$out": {"coll": "results"}}),
        input = Out::new("results"),
    );
    test_statement!(
        out_database,
        expected = Ok(doc! {"$out": {"db": "reporting", "coll": "results"}}),
        input = Out::new("results").and_then(|o| o.in_database("reporting")),
    );
    test_statement!(
        out_empty_collection,
        expected = Err(Error::MissingOperand {
            owner: "$out",
            field: "coll".to_string(),
        }),
        input = Out::new(""),
    );

    test_from_args!(
        out_aliases,
        expected = Ok(doc! {"$out": {"db": "d", "coll": "c"}}),
        stage = "$out",
        args = crate::args! {"collection" => "c", "database" => "d"},
    );
}

mod project {
    use crate::{
        expression::Express,
        stages::{FieldSelection, Project},
        Error,
    };
    use bson::doc;

    test_statement!(
        explicit_projection,
        expected = Ok(doc! {"$project": {"title": 1, "author": 1}}),
        input = Project::new(doc! {"title": 1, "author": 1}),
    );
    test_statement!(
        include_and_exclude,
        expected = Ok(doc! {"$project": {"title": true, "author": true, "_id": false}}),
        input = Project::fields(
            Some(FieldSelection::from(["title", "author"])),
            Some(FieldSelection::from(["_id"])),
        ),
    );
    test_statement!(
        nothing_to_project,
        expected = Err(Error::MissingOperand {
            owner: "$project",
            field: "projection|include|exclude".to_string(),
        }),
        input = Project::fields(None, None),
    );

    #[test]
    fn exclusion_wins_at_its_own_position() {
        let project = Project::fields(
            Some(FieldSelection::from(["a", "b", "c"])),
            Some(FieldSelection::from(["b"])),
        )
        .expect("valid projection");
        let statement = project.statement().expect("renderable");
        let body = statement.get_document("$project").expect("project body");
        assert_eq!(vec!["a", "c", "b"], body.keys().collect::<Vec<_>>());
        assert_eq!(Some(&bson::Bson::Boolean(false)), body.get("b"));
    }

    test_from_args!(
        include_mapping_uses_truthy_keys,
        expected = Ok(doc! {"$project": {"a": true, "c": true}}),
        stage = "$project",
        args = crate::args! {"include" => doc! {"a": 1, "b": 0, "c": true}},
    );
    test_from_args!(
        include_single_name,
        expected = Ok(doc! {"$project": {"a": true}}),
        stage = "$project",
        args = crate::args! {"include" => "a"},
    );
}

mod replace {
    use crate::{
        operators::MergeObjects,
        stages::{ReplaceRoot, ReplaceWith},
        Error,
    };
    use bson::doc;

    test_statement!(
        bare_name_is_normalized,
        expected = Ok(doc! {"$replaceRoot": {"newRoot": "$name"}}),
        input = ReplaceRoot::new("name"),
    );
    test_statement!(
        field_path_is_kept,
        expected = Ok(doc! {"$replaceRoot": {"newRoot": "$a.b"}}),
        input = ReplaceRoot::new("$a.b"),
    );
    test_statement!(
        expression_root,
        expected = Ok(doc! {
            "$replaceRoot": {"newRoot": {"$mergeObjects": [{"dogs": 0}, "$pets"]}}
        }),
        input = ReplaceRoot::new(MergeObjects::new(vec![
            crate::Expression::from(doc! {"dogs": 0}),
            crate::Expression::from("$pets"),
        ])),
    );
    test_statement!(
        replace_with,
        expected = Ok(doc! {"$replaceWith": "$details"}),
        input = ReplaceWith::new("details"),
    );
    test_statement!(
        missing_root,
        expected = Err(Error::MissingOperand {
            owner: "$replaceRoot",
            field: "path".to_string(),
        }),
        input = ReplaceRoot::new(bson::Bson::Null),
    );

    test_from_args!(
        path_aliases,
        expected = Ok(doc! {"$replaceRoot": {"newRoot": "$inner"}}),
        stage = "$replaceRoot",
        args = crate::args! {"path_to_new_root" => "inner"},
    );
    test_from_args!(
        wire_name,
        expected = Ok(doc! {"$replaceRoot": {"newRoot": "$inner"}}),
        stage = "$replaceRoot",
        args = crate::args! {"newRoot" => "inner"},
    );
}

mod set {
    use crate::{
        operators::Sum,
        stages::{AddFields, Set, Unset},
        Error,
    };
    use bson::doc;

    test_statement!(
        set,
        expected = Ok(doc! {"$set": {"total": {"$sum": "$items"}}}),
        input = Set::new(crate::map! {"total" => Sum::new("$items")}),
    );
    test_statement!(
        add_fields,
        expected = Ok(doc! {"$addFields": {"flag": true}}),
        input = AddFields::new(doc! {"flag": true}),
    );
    test_statement!(
        set_empty,
        expected = Err(Error::MissingOperand {
            owner: "$set",
            field: "document".to_string(),
        }),
        input = Set::new(doc! {}),
    );
    test_statement!(
        unset_one,
        expected = Ok(doc! {"$unset": "isbn"}),
        input = Unset::new(["isbn"]),
    );
    test_statement!(
        unset_many,
        expected = Ok(doc! {"$unset": ["isbn", "copies"]}),
        input = Unset::new(["isbn", "copies"]),
    );
    test_statement!(
        unset_nothing,
        expected = Err(Error::MissingOperand {
            owner: "$unset",
            field: "fields".to_string(),
        }),
        input = Unset::new(Vec::<String>::new()),
    );

    test_from_args!(
        unset_single_string,
        expected = Ok(doc! {"$unset": "a"}),
        stage = "$unset",
        args = crate::args! {"field" => "a"},
    );
}

mod sort {
    use crate::{
        expression::Express,
        stages::{FieldSelection, Sort, SortByCount},
        Error,
    };
    use bson::doc;

    test_statement!(
        ascending,
        expected = Ok(doc! {"$sort": {"a": 1, "b": 1}}),
        input = Sort::ascending(["a", "b"]),
    );
    test_statement!(
        explicit_query,
        expected = Ok(doc! {"$sort": {"age": -1, "posts": 1}}),
        input = Sort::new(doc! {"age": -1, "posts": 1}),
    );
    test_statement!(
        explicit_query_with_meta,
        expected = Ok(doc! {"$sort": {"score": {"$meta": "textScore"}, "posts": -1}}),
        input = Sort::new(doc! {"score": {"$meta": "textScore"}, "posts": -1}),
    );
    test_statement!(
        explicit_query_bad_order,
        expected = Err(Error::InvalidOperand {
            owner: "$sort",
            field: "a".to_string(),
            reason: "sort order must be 1, -1 or a `$meta` document".to_string(),
        }),
        input = Sort::new(doc! {"a": 5}),
    );
    test_statement!(
        sort_by_count,
        expected = Ok(doc! {"$sortByCount": "$tags"}),
        input = SortByCount::new("$tags"),
    );

    #[test]
    fn ascending_then_descending() {
        let sort = Sort::fields(
            Some(FieldSelection::from(["a", "b"])),
            Some(FieldSelection::from(["c", "a"])),
        )
        .expect("valid sort");
        let statement = sort.statement().expect("renderable");
        let body = statement.get_document("$sort").expect("sort body");
        assert_eq!(vec!["b", "c", "a"], body.keys().collect::<Vec<_>>());
        assert_eq!(Some(&bson::Bson::Int32(-1)), body.get("a"));
    }

    test_from_args!(
        nothing_to_sort,
        expected = Err(Error::MissingOperand {
            owner: "$sort",
            field: "query|ascending|descending".to_string(),
        }),
        stage = "$sort",
        args = crate::args! {},
    );
    test_from_args!(
        descending_mapping,
        expected = Ok(doc! {"$sort": {"x": -1}}),
        stage = "$sort",
        args = crate::args! {"descending" => doc! {"x": true, "y": false}},
    );
    test_from_args!(
        unknown_field,
        expected = Err(Error::UnexpectedField {
            owner: "$sort",
            field: "order".to_string(),
            expected: "query, ascending, descending".to_string(),
        }),
        stage = "$sort",
        args = crate::args! {"order" => 1},
    );
}

mod unwind {
    use crate::{stages::Unwind, Error};
    use bson::doc;

    test_statement!(
        defaults,
        expected = Ok(doc! {
            "$unwind": {
                "path": "$tags",
                "includeArrayIndex": null,
                "preserveNullAndEmptyArrays": false,
            }
        }),
        input = Unwind::new("tags"),
    );
    test_statement!(
        with_index_and_preserve,
        expected = Ok(doc! {
            "$unwind": {
                "path": "$sizes",
                "includeArrayIndex": "idx",
                "preserveNullAndEmptyArrays": true,
            }
        }),
        input = Unwind::new("$sizes").and_then(|u| u.with_array_index("idx")).map(|u| u.preserving(true)),
    );
    test_statement!(
        index_must_not_be_path,
        expected = Err(Error::InvalidOperand {
            owner: "$unwind",
            field: "include_array_index".to_string(),
            reason: "`$idx` must not start with `$`".to_string(),
        }),
        input = Unwind::new("sizes").and_then(|u| u.with_array_index("$idx")),
    );
    test_statement!(
        empty_path,
        expected = Err(Error::MissingOperand {
            owner: "$unwind",
            field: "path".to_string(),
        }),
        input = Unwind::new(""),
    );
    test_statement!(
        bare_marker_path,
        expected = Err(Error::InvalidOperand {
            owner: "$unwind",
            field: "path".to_string(),
            reason: "`$` does not name a field".to_string(),
        }),
        input = Unwind::new("$"),
    );

    test_from_args!(
        aliases,
        expected = Ok(doc! {
            "$unwind": {
                "path": "$items",
                "includeArrayIndex": null,
                "preserveNullAndEmptyArrays": true,
            }
        }),
        stage = "$unwind",
        args = crate::args! {"path_to_array" => "items", "always" => true},
    );
    test_from_args!(
        wire_names,
        expected = Ok(doc! {
            "$unwind": {
                "path": "$items",
                "includeArrayIndex": "i",
                "preserveNullAndEmptyArrays": false,
            }
        }),
        stage = "$unwind",
        args = crate::args! {"path" => "$items", "includeArrayIndex" => "i"},
    );
}

mod registry {
    use crate::{args::Args, expression::Express, stages};
    use bson::doc;

    #[test]
    fn every_stage_is_registered() {
        let tags: Vec<&str> = stages::tags().collect();
        assert_eq!(
            vec![
                "$addFields",
                "$bucket",
                "$bucketAuto",
                "$count",
                "$group",
                "$limit",
                "$lookup",
                "$match",
                "$out",
                "$project",
                "$replaceRoot",
                "$replaceWith",
                "$sample",
                "$set",
                "$skip",
                "$sort",
                "$sortByCount",
                "$unionWith",
                "$unset",
                "$unwind",
            ],
            tags
        );
    }

    fn minimal_args(tag: &str) -> Args {
        match tag {
            "$addFields" | "$set" => crate::args! {"document" => doc! {"a": 1}},
            "$bucket" => crate::args! {"group_by" => "$a", "boundaries" => vec![0, 10]},
            "$bucketAuto" => crate::args! {"group_by" => "$a", "buckets" => 2},
            "$count" => crate::args! {"name" => "n"},
            "$group" => crate::args! {"by" => "$a", "query" => doc! {"n": {"$sum": 1}}},
            "$limit" | "$sample" | "$skip" => crate::args! {"value" => 1},
            "$lookup" => crate::args! {
                "from" => "b",
                "local_field" => "x",
                "foreign_field" => "y",
                "as" => "z",
            },
            "$match" => crate::args! {"query" => doc! {"a": 1}},
            "$out" | "$unionWith" => crate::args! {"coll" => "c"},
            "$project" => crate::args! {"projection" => doc! {"a": 1}},
            "$replaceRoot" | "$unwind" => crate::args! {"path" => "a"},
            "$replaceWith" => crate::args! {"replacement" => "$a"},
            "$sort" => crate::args! {"query" => doc! {"a": 1}},
            "$sortByCount" => crate::args! {"by" => "$a"},
            "$unset" => crate::args! {"fields" => "a"},
            other => panic!("no arguments for {other}"),
        }
    }

    #[test]
    fn statements_are_idempotent() {
        for tag in stages::tags() {
            let stage = stages::from_args(tag, minimal_args(tag))
                .unwrap_or_else(|e| panic!("{tag} did not build: {e}"));
            let first = stage.statement().expect("renderable");
            assert_eq!(tag, stage.tag());
            assert_eq!(Ok(first), stage.statement(), "{tag}");
        }
    }
}
