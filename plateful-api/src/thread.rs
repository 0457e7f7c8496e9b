//! Nested view of one post's comments, rebuilt on demand from the flat
//! records. The store owns the `parent_id`/`children` edges; this module
//! only resolves them, it never caches across calls.

use std::collections::HashMap;

use crate::{Comment, CommentId};

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// Resolves the adjacency into a forest. Roots keep the input order;
/// replies follow their parent's `children` order. Ids listed as children
/// but missing from the input are skipped (the caller is expected to have
/// fetched the whole post's comments).
pub fn build(comments: &[Comment]) -> Vec<CommentNode> {
    let by_id: HashMap<CommentId, &Comment> = comments.iter().map(|c| (c.id, c)).collect();
    comments
        .iter()
        .filter(|c| c.parent_id.is_none())
        .map(|c| attach(c, &by_id))
        .collect()
}

fn attach(comment: &Comment, by_id: &HashMap<CommentId, &Comment>) -> CommentNode {
    CommentNode {
        comment: comment.clone(),
        replies: comment
            .children
            .iter()
            .filter_map(|id| by_id.get(id))
            .map(|c| attach(c, by_id))
            .collect(),
    }
}

/// Checks that the two directions of the parent/child edge agree: every
/// reply is listed by its parent, every listed child points back, and no
/// reply crosses over to another post.
pub fn verify_links(comments: &[Comment]) -> anyhow::Result<()> {
    let by_id: HashMap<CommentId, &Comment> = comments.iter().map(|c| (c.id, c)).collect();
    for c in comments {
        if let Some(parent_id) = c.parent_id {
            let parent = by_id
                .get(&parent_id)
                .ok_or_else(|| anyhow::anyhow!("comment {:?} has a dangling parent", c.id))?;
            anyhow::ensure!(
                parent.post_id == c.post_id,
                "comment {:?} replies across posts",
                c.id
            );
            anyhow::ensure!(
                parent.children.contains(&c.id),
                "comment {:?} is not listed by its parent {:?}",
                c.id,
                parent_id
            );
        }
        for child_id in &c.children {
            let child = by_id
                .get(child_id)
                .ok_or_else(|| anyhow::anyhow!("comment {:?} lists a dangling child", c.id))?;
            anyhow::ensure!(
                child.parent_id == Some(c.id),
                "comment {:?} lists {:?} as a child but the child disagrees",
                c.id,
                child_id
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewComment, PostId, Requester};

    fn comment(text: &str) -> Comment {
        Comment::now(
            PostId::stub(),
            None,
            NewComment {
                display_name: String::from("User"),
                content: String::from(text),
            },
            &Requester::Anonymous,
        )
    }

    #[test]
    fn builds_a_forest_following_children_order() {
        let mut top = comment("top");
        let mut first = comment("first reply");
        let second = comment("second reply");
        let nested = comment("nested");
        first.parent_id = Some(top.id);
        first.children.push(nested.id);
        let mut nested = nested;
        nested.parent_id = Some(first.id);
        let mut second = second;
        second.parent_id = Some(top.id);
        top.children = vec![first.id, second.id];

        let all = vec![top.clone(), first.clone(), second.clone(), nested.clone()];
        verify_links(&all).unwrap();

        let forest = build(&all);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].comment.id, top.id);
        assert_eq!(forest[0].replies.len(), 2);
        assert_eq!(forest[0].replies[0].comment.id, first.id);
        assert_eq!(forest[0].replies[0].replies[0].comment.id, nested.id);
        assert_eq!(forest[0].replies[1].comment.id, second.id);
    }

    #[test]
    fn one_sided_edges_are_reported() {
        let mut top = comment("top");
        let mut reply = comment("reply");
        reply.parent_id = Some(top.id);
        // parent does not list the reply
        assert!(verify_links(&[top.clone(), reply.clone()]).is_err());

        top.children.push(reply.id);
        verify_links(&[top.clone(), reply.clone()]).unwrap();

        // child listed but pointing elsewhere
        reply.parent_id = None;
        assert!(verify_links(&[top, reply]).is_err());
    }
}
