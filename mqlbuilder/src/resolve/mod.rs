use crate::{
    error::{Error, Result},
    expression::{Express, Expression},
    options::RenderOptions,
};
use bson::{Bson, Document};


/// Resolves an expression into plain data with the default options.
pub fn resolve(expr: &Expression) -> Result<Bson> {
    resolve_with(expr, &RenderOptions::default())
}

pub fn resolve_with(expr: &Expression, options: &RenderOptions) -> Result<Bson> {
    Resolver::new(options).resolve(expr)
}

/// Resolver walks an expression tree, replacing every nested node with its
/// statement. It tracks the chain of nodes currently being resolved so a
/// node that (directly or indirectly) contains itself is reported instead
/// of recursing forever.
pub struct Resolver<'a> {
    options: &'a RenderOptions,
    // (address, tag) of each node on the current resolution path
    path: Vec<(usize, &'static str)>,
}

impl<'a> Resolver<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Resolver {
            options,
            path: Vec::new(),
        }
    }

    pub fn resolve(&mut self, expr: &Expression) -> Result<Bson> {
        Ok(match expr {
            Expression::Literal(b) => b.clone(),
            Expression::Ref(r) => Bson::String(r.to_string()),
            Expression::Document(d) => Bson::Document(
                d.iter()
                    .map(|(k, v)| Ok((k.clone(), self.resolve(v)?)))
                    .collect::<Result<Document>>()?,
            ),
            Expression::Array(a) => Bson::Array(
                a.iter()
                    .map(|e| self.resolve(e))
                    .collect::<Result<Vec<Bson>>>()?,
            ),
            Expression::Node(node) => Bson::Document(self.statement(node.as_ref())?),
        })
    }

    /// Renders `{tag: resolved body}` for a single node.
    pub fn statement<E: Express + ?Sized>(&mut self, node: &E) -> Result<Document> {
        let tag = node.tag();
        let id = (node as *const E as *const () as usize, tag);
        if self.path.contains(&id) || self.path.len() >= self.options.max_depth {
            return Err(Error::CyclicExpression {
                tag,
                depth: self.path.len(),
            });
        }

        self.path.push(id);
        let body = self.resolve(&node.body());
        self.path.pop();

        let mut statement = Document::new();
        statement.insert(tag, body?);
        Ok(statement)
    }
}
