//! In-memory stand-in for the plateful server, with the same domain
//! behavior over `BTreeMap`s instead of postgres. Tests drive this to
//! exercise the comment state machine without a database; keep its
//! semantics aligned with plateful-server's db module.

use std::collections::{btree_map, BTreeMap, HashMap};

use plateful_api::{
    perm, Account, AccountId, AuthToken, Category, CategoryId, Comment, CommentId, CommentSort,
    EditComment, Error, Ingredient, IngredientId, Message, MessageId, NewAccount, NewCategory,
    NewComment, NewIngredient, NewMessage, NewPost, Order, Page, Post, PostFilters, PostId,
    PostSort, Requester, Uuid,
};

pub struct MockServer {
    accounts: BTreeMap<AccountId, Account>,
    sessions: HashMap<AuthToken, AccountId>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    categories: BTreeMap<CategoryId, Category>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    messages: BTreeMap<MessageId, Message>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            accounts: BTreeMap::new(),
            sessions: HashMap::new(),
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            categories: BTreeMap::new(),
            ingredients: BTreeMap::new(),
            messages: BTreeMap::new(),
        }
    }

    // Accounts and identity

    pub fn admin_create_account(&mut self, data: NewAccount) -> Result<Account, Error> {
        data.validate()?;
        if self.accounts.values().any(|a| a.name == data.name) {
            return Err(Error::NameAlreadyUsed(data.name));
        }
        match self.accounts.entry(data.id) {
            btree_map::Entry::Occupied(_) => Err(Error::UuidAlreadyUsed(data.id.0)),
            btree_map::Entry::Vacant(entry) => {
                let account = Account {
                    id: data.id,
                    name: data.name,
                };
                entry.insert(account.clone());
                Ok(account)
            }
        }
    }

    /// Session provisioning is outside the real server; tests get theirs
    /// from here.
    pub fn open_session(&mut self, account: AccountId) -> Result<AuthToken, Error> {
        if !self.accounts.contains_key(&account) {
            return Err(Error::AccountNotFound(account));
        }
        let token = AuthToken(Uuid::new_v4());
        self.sessions.insert(token, account);
        Ok(token)
    }

    fn requester(&self, token: Option<AuthToken>) -> Result<Requester, Error> {
        match token {
            None => Ok(Requester::Anonymous),
            Some(token) => match self.sessions.get(&token) {
                None => Err(Error::PermissionDenied),
                Some(account) => Ok(Requester::Account(*account)),
            },
        }
    }

    fn resolve(&self, token: AuthToken) -> Result<AccountId, Error> {
        match self.sessions.get(&token) {
            None => Err(Error::PermissionDenied),
            Some(account) => Ok(*account),
        }
    }

    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        accounts
    }

    pub fn account(&self, id: AccountId) -> Result<Account, Error> {
        self.accounts
            .get(&id)
            .cloned()
            .ok_or(Error::AccountNotFound(id))
    }

    pub fn account_posts(&self, author: AccountId) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.author == author)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        posts
    }

    // Posts

    pub fn create_post(&mut self, token: AuthToken, data: NewPost) -> Result<Post, Error> {
        let author = self.resolve(token)?;
        data.validate()?;
        let post = Post::now(author, data);
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    pub fn post(&self, id: PostId) -> Result<Post, Error> {
        self.posts.get(&id).cloned().ok_or(Error::PostNotFound(id))
    }

    pub fn search_posts(
        &self,
        filters: &PostFilters,
        sort: PostSort,
        order: Order,
        page: Page,
    ) -> (Vec<Post>, u64) {
        let mut matching: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.published)
            .filter(|p| filters.categories.iter().all(|c| p.categories.contains(c)))
            .filter(|p| {
                filters
                    .ingredients
                    .iter()
                    .all(|i| p.ingredients.contains(i))
            })
            .filter(|p| filters.author.map_or(true, |a| p.author == a))
            .filter(|p| {
                filters.search.as_ref().map_or(true, |s| {
                    p.title.to_lowercase().contains(&s.to_lowercase())
                })
            })
            .cloned()
            .collect();
        let count = matching.len() as u64;
        matching.sort_by(|a, b| {
            let key = match sort {
                PostSort::Date => a.created_at.cmp(&b.created_at),
                PostSort::Alphabetical => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                PostSort::Popularity => a.likes.cmp(&b.likes),
            };
            let key = match order {
                Order::Asc => key,
                Order::Desc => key.reverse(),
            };
            key.then(a.created_at.cmp(&b.created_at)).then(a.id.cmp(&b.id))
        });
        let posts = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        (posts, count)
    }

    pub fn update_post(
        &mut self,
        token: AuthToken,
        id: PostId,
        data: NewPost,
    ) -> Result<Post, Error> {
        let requester = self.resolve(token)?;
        data.validate()?;
        let post = self.posts.get_mut(&id).ok_or(Error::PostNotFound(id))?;
        if post.author != requester {
            return Err(Error::PermissionDenied);
        }
        post.title = data.title;
        post.description = data.description;
        post.text = data.text;
        post.prep_time = data.prep_time;
        post.cook_time = data.cook_time;
        post.serves = data.serves;
        post.categories = data.categories;
        post.ingredients = data.ingredients;
        post.published = data.published;
        Ok(post.clone())
    }

    pub fn delete_post(&mut self, token: AuthToken, id: PostId) -> Result<(), Error> {
        let requester = self.resolve(token)?;
        let post = self.posts.get(&id).ok_or(Error::PostNotFound(id))?;
        if post.author != requester {
            return Err(Error::PermissionDenied);
        }
        self.posts.remove(&id);
        // comments go with the post
        self.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }

    // Comments

    pub fn create_comment(
        &mut self,
        token: Option<AuthToken>,
        post: PostId,
        data: NewComment,
    ) -> Result<Comment, Error> {
        let requester = self.requester(token)?;
        data.validate()?;
        // post existence is deliberately not checked here, matching the
        // real routing layer
        let comment = Comment::now(post, None, data, &requester);
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    pub fn reply(
        &mut self,
        token: Option<AuthToken>,
        post: PostId,
        parent: CommentId,
        data: NewComment,
    ) -> Result<Comment, Error> {
        let requester = self.requester(token)?;
        data.validate()?;
        match self.comments.get(&parent) {
            None => return Err(Error::CommentNotFound(parent)),
            Some(p) if p.post_id != post => return Err(Error::CommentNotFound(parent)),
            Some(_) => (),
        }
        let comment = Comment::now(post, Some(parent), data, &requester);
        self.comments.insert(comment.id, comment.clone());
        self.comments
            .get_mut(&parent)
            .ok_or(Error::ChildAppendRace(parent))?
            .children
            .push(comment.id);
        Ok(comment)
    }

    pub fn list_comments(
        &self,
        post: PostId,
        sort: CommentSort,
        order: Order,
        page: Page,
    ) -> Vec<Comment> {
        let mut comments = self.comments_of(post);
        comments.sort_by(|a, b| {
            let key = match sort {
                CommentSort::Date => a.created_at.cmp(&b.created_at),
                CommentSort::Popularity => a.likes.cmp(&b.likes),
            };
            let key = match order {
                Order::Asc => key,
                Order::Desc => key.reverse(),
            };
            key.then(a.created_at.cmp(&b.created_at)).then(a.id.cmp(&b.id))
        });
        comments
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect()
    }

    /// Every comment of the post, unsorted and unpaginated. Tests use this
    /// to check the tree invariants.
    pub fn comments_of(&self, post: PostId) -> Vec<Comment> {
        self.comments
            .values()
            .filter(|c| c.post_id == post)
            .cloned()
            .collect()
    }

    pub fn comment(&self, id: CommentId) -> Result<Comment, Error> {
        self.comments
            .get(&id)
            .cloned()
            .ok_or(Error::CommentNotFound(id))
    }

    pub fn update_comment(
        &mut self,
        token: Option<AuthToken>,
        post: PostId,
        id: CommentId,
        data: EditComment,
    ) -> Result<Comment, Error> {
        let requester = self.requester(token)?;
        data.validate()?;
        let comment = match self.comments.get_mut(&id) {
            None => return Err(Error::CommentNotFound(id)),
            Some(c) if c.post_id != post => return Err(Error::CommentNotFound(id)),
            Some(c) => c,
        };
        if !perm::can_update(&requester, comment) {
            return Err(Error::PermissionDenied);
        }
        comment.display_name = data.display_name;
        comment.content = data.content;
        Ok(comment.clone())
    }

    /// Returns the tombstone view when the record survives for its
    /// children, `None` when it was removed for good
    pub fn delete_comment(
        &mut self,
        token: Option<AuthToken>,
        post: PostId,
        id: CommentId,
    ) -> Result<Option<Comment>, Error> {
        let requester = self.requester(token)?;
        let comment = match self.comments.get(&id) {
            None => return Err(Error::CommentNotFound(id)),
            Some(c) if c.post_id != post => return Err(Error::CommentNotFound(id)),
            Some(c) => c.clone(),
        };
        let post_author = self
            .posts
            .get(&post)
            .ok_or(Error::PostNotFound(post))?
            .author;
        if !perm::can_delete(&requester, &comment, post_author) {
            return Err(Error::PermissionDenied);
        }
        // tombstone-or-remove, decided at delete time
        if comment.children.is_empty() {
            self.comments.remove(&id);
            if let Some(parent) = comment.parent_id.and_then(|p| self.comments.get_mut(&p)) {
                parent.children.retain(|c| *c != id);
            }
            Ok(None)
        } else {
            let comment = self
                .comments
                .get_mut(&id)
                .ok_or(Error::CommentNotFound(id))?;
            comment.tombstone();
            Ok(Some(comment.clone()))
        }
    }

    // Categories and ingredients

    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        categories
    }

    pub fn category_by_name(&self, name: &str) -> Result<Category, Error> {
        self.categories
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| Error::CategoryNotFound(String::from(name)))
    }

    pub fn create_category(
        &mut self,
        token: AuthToken,
        data: NewCategory,
    ) -> Result<Category, Error> {
        self.resolve(token)?;
        data.validate()?;
        if self
            .categories
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(&data.name))
        {
            return Err(Error::NameAlreadyUsed(data.name));
        }
        let category = Category::new(data);
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    pub fn delete_category(&mut self, token: AuthToken, id: CategoryId) -> Result<(), Error> {
        self.resolve(token)?;
        if self.categories.remove(&id).is_none() {
            return Err(Error::CategoryNotFound(id.0.to_string()));
        }
        for post in self.posts.values_mut() {
            post.categories.retain(|c| *c != id);
        }
        Ok(())
    }

    pub fn ingredients(&self) -> Vec<Ingredient> {
        let mut ingredients: Vec<Ingredient> = self.ingredients.values().cloned().collect();
        ingredients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        ingredients
    }

    pub fn ingredient_by_name(&self, name: &str) -> Result<Ingredient, Error> {
        self.ingredients
            .values()
            .find(|i| i.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| Error::IngredientNotFound(String::from(name)))
    }

    pub fn create_ingredient(
        &mut self,
        token: AuthToken,
        data: NewIngredient,
    ) -> Result<Ingredient, Error> {
        self.resolve(token)?;
        data.validate()?;
        if self
            .ingredients
            .values()
            .any(|i| i.name.eq_ignore_ascii_case(&data.name))
        {
            return Err(Error::NameAlreadyUsed(data.name));
        }
        let ingredient = Ingredient::new(data);
        self.ingredients.insert(ingredient.id, ingredient.clone());
        Ok(ingredient)
    }

    pub fn delete_ingredient(&mut self, token: AuthToken, id: IngredientId) -> Result<(), Error> {
        self.resolve(token)?;
        if self.ingredients.remove(&id).is_none() {
            return Err(Error::IngredientNotFound(id.0.to_string()));
        }
        for post in self.posts.values_mut() {
            post.ingredients.retain(|i| *i != id);
        }
        Ok(())
    }

    // Messages

    pub fn create_message(&mut self, data: NewMessage) -> Result<Message, Error> {
        data.validate()?;
        let message = Message::now(data);
        self.messages.insert(message.id, message.clone());
        Ok(message)
    }

    pub fn messages(&self) -> Vec<Message> {
        let mut messages: Vec<Message> = self.messages.values().cloned().collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        messages
    }

    pub fn message(&self, id: MessageId) -> Result<Message, Error> {
        self.messages
            .get(&id)
            .cloned()
            .ok_or(Error::MessageNotFound(id))
    }

    pub fn delete_message(&mut self, id: MessageId) -> Result<(), Error> {
        if self.messages.remove(&id).is_none() {
            return Err(Error::MessageNotFound(id));
        }
        Ok(())
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateful_api::{thread, InvalidField, TOMBSTONE};

    fn new_account(server: &mut MockServer, name: &str) -> (AccountId, AuthToken) {
        let id = AccountId(Uuid::new_v4());
        server
            .admin_create_account(NewAccount {
                id,
                name: String::from(name),
            })
            .expect("creating account");
        let token = server.open_session(id).expect("opening session");
        (id, token)
    }

    fn new_post(server: &mut MockServer, token: AuthToken, title: &str) -> PostId {
        server
            .create_post(
                token,
                NewPost {
                    title: String::from(title),
                    description: None,
                    text: String::from("Stir well."),
                    prep_time: None,
                    cook_time: None,
                    serves: None,
                    categories: Vec::new(),
                    ingredients: Vec::new(),
                    published: true,
                },
            )
            .expect("creating post")
            .id
    }

    fn comment_data(name: &str, content: &str) -> NewComment {
        NewComment {
            display_name: String::from(name),
            content: String::from(content),
        }
    }

    fn assert_tree_consistent(server: &MockServer, post: PostId) {
        thread::verify_links(&server.comments_of(post)).expect("tree links");
    }

    #[test]
    fn end_to_end_scenario() {
        let mut server = MockServer::new();
        let (_u1, t1) = new_account(&mut server, "u1");
        let (_u2, t2) = new_account(&mut server, "u2");
        let (_u3, t3) = new_account(&mut server, "u3");
        let post = new_post(&mut server, t1, "Shakshuka");

        let c1 = server
            .create_comment(None, post, comment_data("User", "Hello"))
            .expect("creating anonymous comment");
        assert_eq!(c1.account_id, None);

        let c2 = server
            .reply(Some(t2), post, c1.id, comment_data("User2", "Reply"))
            .expect("replying as u2");
        assert_eq!(c2.parent_id, Some(c1.id));
        assert!(server.comment(c1.id).unwrap().children.contains(&c2.id));
        assert_tree_consistent(&server, post);

        // the post author deletes the anonymous top comment
        let tombstone = server
            .delete_comment(Some(t1), post, c1.id)
            .expect("deleting c1")
            .expect("c1 has a child, so it must be tombstoned");
        assert_eq!(tombstone.content, TOMBSTONE);
        let c1_after = server.comment(c1.id).unwrap();
        assert_eq!(c1_after.display_name, TOMBSTONE);
        assert_eq!(c1_after.content, TOMBSTONE);
        assert_eq!(c1_after.account_id, None);
        assert!(c1_after.deleted);
        let c2_after = server.comment(c2.id).unwrap();
        assert_eq!(c2_after.parent_id, Some(c1.id));
        assert_eq!(c2_after.content, "Reply");

        // a third user may not delete u2's comment
        assert_eq!(
            server.delete_comment(Some(t3), post, c2.id),
            Err(Error::PermissionDenied)
        );
        assert_tree_consistent(&server, post);
    }

    #[test]
    fn deleting_a_leaf_removes_it_and_unlinks_it() {
        let mut server = MockServer::new();
        let (_u1, t1) = new_account(&mut server, "author");
        let post = new_post(&mut server, t1, "Soup");

        let top = server
            .create_comment(Some(t1), post, comment_data("A", "top"))
            .unwrap();
        let leaf = server
            .reply(Some(t1), post, top.id, comment_data("A", "leaf"))
            .unwrap();
        assert!(server.comment(top.id).unwrap().children.contains(&leaf.id));

        let outcome = server.delete_comment(Some(t1), post, leaf.id).unwrap();
        assert_eq!(outcome, None);
        assert_eq!(
            server.comment(leaf.id),
            Err(Error::CommentNotFound(leaf.id))
        );
        assert!(!server.comment(top.id).unwrap().children.contains(&leaf.id));
        assert_tree_consistent(&server, post);

        // the parent became a leaf again, so deleting it now removes it
        let outcome = server.delete_comment(Some(t1), post, top.id).unwrap();
        assert_eq!(outcome, None);
        assert_eq!(server.comments_of(post).len(), 0);
    }

    #[test]
    fn deleting_a_parent_tombstones_it_and_keeps_children_reachable() {
        let mut server = MockServer::new();
        let (_u1, t1) = new_account(&mut server, "author");
        let (_u2, t2) = new_account(&mut server, "commenter");
        let post = new_post(&mut server, t1, "Stew");

        let top = server
            .create_comment(Some(t2), post, comment_data("B", "parent"))
            .unwrap();
        let r1 = server
            .reply(Some(t2), post, top.id, comment_data("B", "first"))
            .unwrap();
        let r2 = server
            .reply(None, post, top.id, comment_data("C", "second"))
            .unwrap();

        let view = server
            .delete_comment(Some(t2), post, top.id)
            .unwrap()
            .expect("tombstone view");
        assert!(view.deleted);
        for id in [r1.id, r2.id] {
            let child = server.comment(id).unwrap();
            assert_eq!(child.parent_id, Some(top.id));
            assert!(!child.deleted);
        }
        // tombstoned, not removed: still listed with its children
        let top_after = server.comment(top.id).unwrap();
        assert_eq!(top_after.children, vec![r1.id, r2.id]);
        assert_tree_consistent(&server, post);

        // no un-delete: a reply can still land under the tombstone
        let r3 = server
            .reply(None, post, top.id, comment_data("D", "late"))
            .unwrap();
        assert!(server.comment(top.id).unwrap().children.contains(&r3.id));
        assert!(server.comment(top.id).unwrap().deleted);
        assert_tree_consistent(&server, post);
    }

    #[test]
    fn tombstoned_parent_collapses_once_children_are_gone() {
        let mut server = MockServer::new();
        let (_u1, t1) = new_account(&mut server, "author");
        let post = new_post(&mut server, t1, "Pie");

        let top = server
            .create_comment(Some(t1), post, comment_data("A", "top"))
            .unwrap();
        let mid = server
            .reply(Some(t1), post, top.id, comment_data("A", "mid"))
            .unwrap();
        let leaf = server
            .reply(Some(t1), post, mid.id, comment_data("A", "leaf"))
            .unwrap();

        assert!(server
            .delete_comment(Some(t1), post, mid.id)
            .unwrap()
            .is_some());
        assert!(server
            .delete_comment(Some(t1), post, leaf.id)
            .unwrap()
            .is_none());
        assert_tree_consistent(&server, post);

        // the tombstone lost its last child and can now be removed
        assert!(server
            .delete_comment(Some(t1), post, mid.id)
            .unwrap()
            .is_none());
        assert_eq!(server.comment(top.id).unwrap().children, Vec::new());
        assert_tree_consistent(&server, post);
    }

    #[test]
    fn delete_permissions_follow_authorship() {
        let mut server = MockServer::new();
        let (_author, t_author) = new_account(&mut server, "author");
        let (_u2, t2) = new_account(&mut server, "u2");
        let (_u3, t3) = new_account(&mut server, "u3");
        let post = new_post(&mut server, t_author, "Bread");

        // anonymously authored: only the post author may delete
        let anon = server
            .create_comment(None, post, comment_data("User", "hi"))
            .unwrap();
        assert_eq!(
            server.delete_comment(None, post, anon.id),
            Err(Error::PermissionDenied)
        );
        assert_eq!(
            server.delete_comment(Some(t2), post, anon.id),
            Err(Error::PermissionDenied)
        );
        assert_eq!(server.delete_comment(Some(t_author), post, anon.id), Ok(None));

        // account-authored: the author and the post author, nobody else
        let owned = server
            .create_comment(Some(t2), post, comment_data("U2", "mine"))
            .unwrap();
        assert_eq!(
            server.delete_comment(Some(t3), post, owned.id),
            Err(Error::PermissionDenied)
        );
        assert_eq!(server.delete_comment(Some(t2), post, owned.id), Ok(None));

        let owned = server
            .create_comment(Some(t2), post, comment_data("U2", "mine too"))
            .unwrap();
        assert_eq!(
            server.delete_comment(Some(t_author), post, owned.id),
            Ok(None)
        );
    }

    #[test]
    fn update_is_for_the_author_alone_and_dies_with_the_tombstone() {
        let mut server = MockServer::new();
        let (_author, t_author) = new_account(&mut server, "author");
        let (_u2, t2) = new_account(&mut server, "u2");
        let post = new_post(&mut server, t_author, "Cake");
        let edit = EditComment {
            display_name: String::from("U2"),
            content: String::from("edited"),
        };

        // anonymously authored comments are never editable, not even by
        // the post author
        let anon = server
            .create_comment(None, post, comment_data("User", "hi"))
            .unwrap();
        assert_eq!(
            server.update_comment(Some(t_author), post, anon.id, edit.clone()),
            Err(Error::PermissionDenied)
        );

        let owned = server
            .create_comment(Some(t2), post, comment_data("U2", "orig"))
            .unwrap();
        assert_eq!(
            server.update_comment(Some(t_author), post, owned.id, edit.clone()),
            Err(Error::PermissionDenied)
        );
        let updated = server
            .update_comment(Some(t2), post, owned.id, edit.clone())
            .unwrap();
        assert_eq!(updated.content, "edited");

        // tombstoning clears the author, so editing stops working
        server
            .reply(None, post, owned.id, comment_data("User", "reply"))
            .unwrap();
        server
            .delete_comment(Some(t2), post, owned.id)
            .unwrap()
            .expect("tombstoned");
        assert_eq!(
            server.update_comment(Some(t2), post, owned.id, edit),
            Err(Error::PermissionDenied)
        );
    }

    #[test]
    fn comment_validation_reports_fields_in_order() {
        let mut server = MockServer::new();
        let post = PostId(Uuid::new_v4());
        let err = server
            .create_comment(None, post, comment_data(" ", ""))
            .unwrap_err();
        assert_eq!(
            err,
            Error::Validation(vec![
                InvalidField {
                    field: String::from("display_name"),
                    message: String::from("Display name must be specified."),
                },
                InvalidField {
                    field: String::from("content"),
                    message: String::from("Content must be specified."),
                },
            ])
        );
    }

    #[test]
    fn replies_may_not_cross_posts() {
        let mut server = MockServer::new();
        let (_u1, t1) = new_account(&mut server, "author");
        let post_a = new_post(&mut server, t1, "A");
        let post_b = new_post(&mut server, t1, "B");
        let on_a = server
            .create_comment(None, post_a, comment_data("User", "hi"))
            .unwrap();
        assert_eq!(
            server.reply(None, post_b, on_a.id, comment_data("User", "hi")),
            Err(Error::CommentNotFound(on_a.id))
        );
        assert_tree_consistent(&server, post_a);
        assert_tree_consistent(&server, post_b);
    }

    #[test]
    fn comment_listing_sorts_and_paginates() {
        let mut server = MockServer::new();
        let (_u1, t1) = new_account(&mut server, "author");
        let post = new_post(&mut server, t1, "Salad");
        let base = chrono::Utc::now();
        let mut ids = Vec::new();
        for i in 0..5i64 {
            let c = server
                .create_comment(None, post, comment_data("User", &format!("c{i}")))
                .unwrap();
            // pin timestamps and likes so ordering is not left to the clock
            let stored = server.comments.get_mut(&c.id).unwrap();
            stored.created_at = base + chrono::Duration::seconds(i);
            stored.likes = (5 - i) % 3;
            ids.push(c.id);
        }

        let newest_first = server.list_comments(
            post,
            CommentSort::Date,
            Order::Desc,
            Page::comments(None, None),
        );
        assert_eq!(
            newest_first.iter().map(|c| c.id).collect::<Vec<_>>(),
            ids.iter().rev().cloned().collect::<Vec<_>>()
        );

        // likes are 2, 1, 0, 2, 1; descending popularity breaks ties by
        // oldest first
        let popular = server.list_comments(
            post,
            CommentSort::Popularity,
            Order::Desc,
            Page::comments(None, None),
        );
        assert_eq!(
            popular.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![ids[0], ids[3], ids[1], ids[4], ids[2]]
        );

        let second_page =
            server.list_comments(post, CommentSort::Date, Order::Asc, Page::comments(Some(2), Some(2)));
        assert_eq!(
            second_page.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![ids[2], ids[3]]
        );

        // tombstones stay visible in the listing
        server
            .reply(None, post, ids[0], comment_data("User", "r"))
            .unwrap();
        server.delete_comment(Some(t1), post, ids[0]).unwrap();
        let listed = server.list_comments(
            post,
            CommentSort::Date,
            Order::Asc,
            Page::comments(None, None),
        );
        assert!(listed.iter().any(|c| c.id == ids[0] && c.deleted));
    }

    #[test]
    fn post_search_filters_and_counts() {
        let mut server = MockServer::new();
        let (author, t1) = new_account(&mut server, "author");
        let (_other, t2) = new_account(&mut server, "other");
        let dessert = server
            .create_category(
                t1,
                NewCategory {
                    name: String::from("Dessert"),
                    description: None,
                },
            )
            .unwrap();

        let mut mk = |token: AuthToken, title: &str, published: bool, categories: Vec<CategoryId>| {
            server
                .create_post(
                    token,
                    NewPost {
                        title: String::from(title),
                        description: None,
                        text: String::from("text"),
                        prep_time: None,
                        cook_time: None,
                        serves: None,
                        categories,
                        ingredients: Vec::new(),
                        published,
                    },
                )
                .unwrap()
                .id
        };
        let tart = mk(t1, "Apple tart", true, vec![dessert.id]);
        let _draft = mk(t1, "Apple draft", false, vec![dessert.id]);
        let _soup = mk(t2, "Onion soup", true, Vec::new());

        let (posts, count) = server.search_posts(
            &PostFilters {
                categories: vec![dessert.id],
                ..PostFilters::default()
            },
            PostSort::Date,
            Order::Desc,
            Page::posts(None, None),
        );
        assert_eq!(count, 1);
        assert_eq!(posts[0].id, tart);

        let (posts, count) = server.search_posts(
            &PostFilters {
                search: Some(String::from("apple")),
                ..PostFilters::default()
            },
            PostSort::Alphabetical,
            Order::Asc,
            Page::posts(None, None),
        );
        assert_eq!((posts.len(), count), (1, 1));

        let (_, count) = server.search_posts(
            &PostFilters {
                author: Some(author),
                ..PostFilters::default()
            },
            PostSort::Date,
            Order::Desc,
            Page::posts(None, None),
        );
        assert_eq!(count, 1);

        // category deletion untags the remaining posts
        server.delete_category(t1, dessert.id).unwrap();
        assert_eq!(server.post(tart).unwrap().categories, Vec::new());
    }

    #[test]
    fn duplicate_names_conflict() {
        let mut server = MockServer::new();
        let (id, t1) = new_account(&mut server, "alice");
        assert_eq!(
            server.admin_create_account(NewAccount {
                id: AccountId(Uuid::new_v4()),
                name: String::from("alice"),
            }),
            Err(Error::NameAlreadyUsed(String::from("alice")))
        );
        assert_eq!(
            server.admin_create_account(NewAccount {
                id,
                name: String::from("bob"),
            }),
            Err(Error::UuidAlreadyUsed(id.0))
        );

        server
            .create_category(
                t1,
                NewCategory {
                    name: String::from("Dinner"),
                    description: None,
                },
            )
            .unwrap();
        assert_eq!(
            server.create_category(
                t1,
                NewCategory {
                    name: String::from("dinner"),
                    description: None,
                },
            ),
            Err(Error::NameAlreadyUsed(String::from("dinner")))
        );
    }

    #[test]
    fn messages_validate_and_round_trip() {
        let mut server = MockServer::new();
        let err = server
            .create_message(NewMessage {
                name: String::new(),
                email: String::new(),
                message: String::from("hi"),
            })
            .unwrap_err();
        match err {
            Error::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["name", "email"]);
            }
            other => panic!("expected a validation error, got {other:?}"),
        }

        let sent = server
            .create_message(NewMessage {
                name: String::from("Jo"),
                email: String::from("jo@example.com"),
                message: String::from("Love the tarts"),
            })
            .unwrap();
        assert_eq!(server.message(sent.id).unwrap(), sent);
        assert_eq!(server.messages().len(), 1);
        server.delete_message(sent.id).unwrap();
        assert_eq!(
            server.delete_message(sent.id),
            Err(Error::MessageNotFound(sent.id))
        );
    }
}
